use crate::flash::set_flash;
use crate::listing::Listable;
use crate::logging::log_action;
use crate::notification::Severity;
use crate::security::{ensure_permission, guard_mutation};
use crate::services::{BemProfileRecord, PortalContext, PortalService, ServiceResult};
use crate::uploads::AttachmentField;
use crate::validation::FormValidator;
use serde_json::json;

pub const PERMISSION: &str = "manage_bem";

impl Listable for BemProfileRecord {
    fn key(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.cabinet_name.clone(), self.period.clone()]
    }
}

pub fn list_bem_profiles<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<()> {
    ensure_permission(ctx, PERMISSION)?;
    let rows = service.list_bem_profiles()?;
    ctx.context.set(
        "bem_profiles",
        rows.iter()
            .map(|row| {
                json!({
                    "id": row.id,
                    "cabinet_name": row.cabinet_name,
                    "period": row.period,
                    "vision": row.vision,
                    "mission": row.mission,
                    "logo": row.logo,
                })
            })
            .collect::<Vec<_>>(),
    );
    Ok(())
}

pub fn save_bem_profile<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    logo: &AttachmentField,
) -> ServiceResult<i64> {
    guard_mutation(service, ctx, PERMISSION)?;
    let mut validator = FormValidator::new();
    let cabinet_name = validator.required(&ctx.post_vars, "cabinet_name");
    validator.max_len("cabinet_name", &cabinet_name, 120);
    let period = validator.required(&ctx.post_vars, "period");
    validator.max_len("period", &period, 20);
    let vision = validator.required(&ctx.post_vars, "vision");
    let mission = validator.required(&ctx.post_vars, "mission");
    logo.validate(&mut validator);
    validator.finish()?;
    let mut record = BemProfileRecord {
        id: ctx.post_vars.int("id").unwrap_or(0),
        cabinet_name,
        period,
        vision,
        mission,
        logo: None,
    };
    if record.id > 0 {
        record.logo = service
            .list_bem_profiles()?
            .into_iter()
            .find(|profile| profile.id == record.id)
            .and_then(|profile| profile.logo);
    }
    if let Some(stored) = logo.store(service)? {
        record.logo = Some(stored);
    }
    let id = service.save_bem_profile(record)?;
    log_action(service, ctx, "save_bem_profile", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Profil BEM berhasil disimpan");
    Ok(id)
}

pub fn destroy_bem_profile<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    service.delete_bem_profile(id)?;
    log_action(service, ctx, "delete_bem_profile", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Profil BEM berhasil dihapus");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{InMemoryService, PortalError};

    fn admin_ctx() -> PortalContext {
        let mut ctx = PortalContext::default();
        ctx.user_info.id = 1;
        ctx.user_info.is_guest = false;
        ctx.user_info.is_admin = true;
        ctx
    }

    fn fill_form(ctx: &mut PortalContext, period: &str) {
        ctx.post_vars.set("cabinet_name", "Kabinet Sinergi Muda");
        ctx.post_vars.set("period", period);
        ctx.post_vars.set("vision", "Kampus yang inklusif");
        ctx.post_vars.set("mission", "Advokasi dan pengabdian");
    }

    #[test]
    fn profiles_listed_newest_period_first() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        fill_form(&mut ctx, "2025/2026");
        save_bem_profile(&service, &mut ctx, &AttachmentField::new("logo")).unwrap();
        let mut ctx = admin_ctx();
        list_bem_profiles(&service, &mut ctx).unwrap();
        let rows = ctx.context.get("bem_profiles").unwrap();
        assert_eq!(rows[0].get("period").unwrap(), "2025/2026");
    }

    #[test]
    fn duplicate_period_surfaces_field_error() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        fill_form(&mut ctx, "2024/2025");
        let err =
            save_bem_profile(&service, &mut ctx, &AttachmentField::new("logo")).unwrap_err();
        match err {
            PortalError::Validation(errors) => assert!(errors.get("period").is_some()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn destroy_removes_profile() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        destroy_bem_profile(&service, &mut ctx, 1).unwrap();
        assert!(service.list_bem_profiles().unwrap().is_empty());
    }
}
