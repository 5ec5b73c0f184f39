use crate::flash::set_flash;
use crate::listing::Listable;
use crate::logging::log_action;
use crate::notification::Severity;
use crate::security::{ensure_permission, guard_mutation};
use crate::services::{
    AchievementTypeRecord, PortalContext, PortalError, PortalService, ServiceResult,
};
use crate::validation::FormValidator;
use serde_json::json;

pub const PERMISSION: &str = "manage_achievements";

impl Listable for AchievementTypeRecord {
    fn key(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

pub fn list_achievement_types<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<()> {
    ensure_permission(ctx, PERMISSION)?;
    let rows = service.list_achievement_types()?;
    let mut entries = Vec::new();
    for row in &rows {
        entries.push(json!({
            "id": row.id,
            "name": row.name,
            "description": row.description,
            "achievement_count": service.achievements_with_type(row.id)?,
        }));
    }
    ctx.context.set("achievement_types", entries);
    Ok(())
}

pub fn save_achievement_type<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<i64> {
    guard_mutation(service, ctx, PERMISSION)?;
    let mut validator = FormValidator::new();
    let name = validator.required(&ctx.post_vars, "name");
    validator.max_len("name", &name, 80);
    let description = validator.optional(&ctx.post_vars, "description");
    validator.max_len("description", &description, 500);
    validator.finish()?;
    let record = AchievementTypeRecord {
        id: ctx.post_vars.int("id").unwrap_or(0),
        name,
        description,
    };
    let is_update = record.id > 0;
    let id = service.save_achievement_type(record)?;
    log_action(
        service,
        ctx,
        if is_update {
            "update_achievement_type"
        } else {
            "store_achievement_type"
        },
        json!({ "id": id }),
    )?;
    set_flash(ctx, Severity::Success, "Jenis prestasi berhasil disimpan");
    Ok(id)
}

/// Deleting a type still referenced by achievements is refused with a
/// field-keyed error rather than cascading.
pub fn destroy_achievement_type<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    if service.achievements_with_type(id)? > 0 {
        return Err(PortalError::invalid(
            "type_id",
            "jenis masih dipakai oleh data prestasi",
        ));
    }
    service.delete_achievement_type(id)?;
    log_action(service, ctx, "delete_achievement_type", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Jenis prestasi berhasil dihapus");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryService;

    fn admin_ctx() -> PortalContext {
        let mut ctx = PortalContext::default();
        ctx.user_info.id = 1;
        ctx.user_info.is_guest = false;
        ctx.user_info.is_admin = true;
        ctx
    }

    #[test]
    fn index_counts_usage() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        list_achievement_types(&service, &mut ctx).unwrap();
        let rows = ctx.context.get("achievement_types").unwrap();
        assert_eq!(rows[0].get("achievement_count").unwrap(), 1);
    }

    #[test]
    fn save_requires_name() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        let err = save_achievement_type(&service, &mut ctx).unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
    }

    #[test]
    fn type_in_use_refuses_delete() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        let err = destroy_achievement_type(&service, &mut ctx, 1).unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
        assert_eq!(service.list_achievement_types().unwrap().len(), 2);
    }

    #[test]
    fn unused_type_deletes() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        ctx.post_vars.set("name", "Kewirausahaan");
        let id = save_achievement_type(&service, &mut ctx).unwrap();
        destroy_achievement_type(&service, &mut ctx, id).unwrap();
        assert_eq!(service.list_achievement_types().unwrap().len(), 2);
    }
}
