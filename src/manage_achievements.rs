use crate::flash::set_flash;
use crate::listing::{self, Listable, SortDirection};
use crate::logging::log_action;
use crate::notification::Severity;
use crate::security::{ensure_permission, guard_mutation};
use crate::services::{
    AchievementRecord, PortalContext, PortalError, PortalService, ServiceResult,
};
use crate::uploads::AttachmentField;
use crate::validation::FormValidator;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;
use std::collections::HashMap;

pub const PERMISSION: &str = "manage_achievements";

impl Listable for AchievementRecord {
    fn key(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.title.clone(), self.student_name.clone()]
    }
}

/// Index screen: the full list filtered by `search` and ordered by the
/// achievement date, newest first unless the request asks otherwise.
pub fn list_achievements<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<()> {
    ensure_permission(ctx, PERMISSION)?;
    let rows = service.list_achievements()?;
    let types: HashMap<i64, String> = service
        .list_achievement_types()?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();
    let query = ctx.request.string("search").unwrap_or_default();
    let direction = match ctx.request.string("direction").as_deref() {
        Some("asc") => SortDirection::Ascending,
        _ => SortDirection::Descending,
    };
    let rows = listing::apply(&rows, &query, |row| row.achieved_at, direction);
    ctx.context.set(
        "achievements",
        rows.iter()
            .map(|row| {
                json!({
                    "id": row.id,
                    "title": row.title,
                    "student_name": row.student_name,
                    "type": types.get(&row.type_id),
                    "achieved_at": row.achieved_at,
                    "image": row.image,
                })
            })
            .collect::<Vec<_>>(),
    );
    ctx.context.set("achievement_total", rows.len());
    Ok(())
}

fn read_form(ctx: &PortalContext, image: &AttachmentField) -> ServiceResult<AchievementRecord> {
    let mut validator = FormValidator::new();
    let title = validator.required(&ctx.post_vars, "title");
    validator.max_len("title", &title, 150);
    let student_name = validator.required(&ctx.post_vars, "student_name");
    validator.max_len("student_name", &student_name, 100);
    let description = validator.optional(&ctx.post_vars, "description");
    validator.max_len("description", &description, 2000);
    let type_id = validator.required_int(&ctx.post_vars, "type_id");
    let achieved_at = match ctx.post_vars.string("achieved_at") {
        Some(raw) if !raw.trim().is_empty() => match parse_date(raw.trim()) {
            Some(date) => Some(date),
            None => {
                validator.push("achieved_at", "format tanggal tidak dikenali");
                None
            }
        },
        _ => {
            validator.push("achieved_at", "wajib diisi");
            None
        }
    };
    image.validate(&mut validator);
    validator.finish()?;
    Ok(AchievementRecord {
        id: ctx.post_vars.int("id").unwrap_or(0),
        title,
        student_name,
        description,
        type_id,
        achieved_at,
        image: None,
    })
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Shared by store and update: full replace of the editable fields, with the
/// image persisted first when one was attached.
pub fn save_achievement<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    image: &AttachmentField,
) -> ServiceResult<i64> {
    guard_mutation(service, ctx, PERMISSION)?;
    let mut record = read_form(ctx, image)?;
    if record.id > 0 {
        let existing = service
            .get_achievement(record.id)?
            .ok_or_else(|| PortalError::NotFound(format!("achievement {}", record.id)))?;
        record.image = existing.image;
    }
    if let Some(stored) = image.store(service)? {
        record.image = Some(stored);
    }
    let is_update = record.id > 0;
    let id = service.save_achievement(record)?;
    log_action(
        service,
        ctx,
        if is_update {
            "update_achievement"
        } else {
            "store_achievement"
        },
        json!({ "id": id }),
    )?;
    set_flash(ctx, Severity::Success, "Prestasi berhasil disimpan");
    ctx.context.set("saved_id", id);
    Ok(id)
}

pub fn destroy_achievement<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    service.delete_achievement(id)?;
    log_action(service, ctx, "delete_achievement", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Prestasi berhasil dihapus");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{ImageUpload, InMemoryService};

    fn admin_ctx() -> PortalContext {
        let mut ctx = PortalContext::default();
        ctx.user_info.id = 1;
        ctx.user_info.is_guest = false;
        ctx.user_info.is_admin = true;
        ctx
    }

    fn fill_valid_form(ctx: &mut PortalContext) {
        ctx.post_vars.set("title", "Juara 2 Hackathon Nasional");
        ctx.post_vars.set("student_name", "Agus Salim");
        ctx.post_vars.set("description", "Tim dari fakultas teknik");
        ctx.post_vars.set("type_id", 1);
        ctx.post_vars.set("achieved_at", "2025-05-20");
    }

    #[test]
    fn index_requires_permission() {
        let service = InMemoryService::default();
        let mut ctx = PortalContext::default();
        assert!(list_achievements(&service, &mut ctx).is_err());
    }

    #[test]
    fn index_resolves_type_names() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        list_achievements(&service, &mut ctx).unwrap();
        let rows = ctx.context.get("achievements").unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(rows[0].get("type").unwrap(), "Non-Akademik");
    }

    #[test]
    fn search_filters_index() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        ctx.request.set("search", "karya tulis");
        list_achievements(&service, &mut ctx).unwrap();
        assert_eq!(ctx.context.int("achievement_total"), Some(1));
    }

    #[test]
    fn store_with_missing_title_is_field_error() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        fill_valid_form(&mut ctx);
        ctx.post_vars.set("title", "");
        let err = save_achievement(&service, &mut ctx, &AttachmentField::new("image"))
            .unwrap_err();
        match err {
            PortalError::Validation(errors) => {
                assert_eq!(errors.get("title"), Some("wajib diisi"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(service.list_achievements().unwrap().len(), 2);
    }

    #[test]
    fn store_persists_and_flashes() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        fill_valid_form(&mut ctx);
        let id = save_achievement(&service, &mut ctx, &AttachmentField::new("image")).unwrap();
        assert!(service.get_achievement(id).unwrap().is_some());
        assert!(ctx.session.contains("flash"));
        let logs = service.list_action_logs().unwrap();
        assert_eq!(logs[0].action, "store_achievement");
    }

    #[test]
    fn store_with_image_attaches_stored_path() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        fill_valid_form(&mut ctx);
        let mut image = AttachmentField::new("image");
        image.pick(ImageUpload {
            name: "sertifikat.jpg".into(),
            tmp_path: "/tmp/sertifikat.jpg".into(),
            size: 120_000,
            mime_type: "image/jpeg".into(),
        });
        let id = save_achievement(&service, &mut ctx, &image).unwrap();
        let record = service.get_achievement(id).unwrap().unwrap();
        assert!(record.image.unwrap().path.ends_with("sertifikat.jpg"));
    }

    #[test]
    fn update_keeps_existing_image() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        fill_valid_form(&mut ctx);
        let mut image = AttachmentField::new("image");
        image.pick(ImageUpload {
            name: "awal.png".into(),
            tmp_path: "/tmp/awal.png".into(),
            size: 50_000,
            mime_type: "image/png".into(),
        });
        let id = save_achievement(&service, &mut ctx, &image).unwrap();

        let mut ctx = admin_ctx();
        fill_valid_form(&mut ctx);
        ctx.post_vars.set("id", id);
        ctx.post_vars.set("title", "Judul diperbarui");
        save_achievement(&service, &mut ctx, &AttachmentField::new("image")).unwrap();
        let record = service.get_achievement(id).unwrap().unwrap();
        assert_eq!(record.title, "Judul diperbarui");
        assert!(record.image.unwrap().path.ends_with("awal.png"));
    }

    #[test]
    fn destroy_removes_and_logs() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        destroy_achievement(&service, &mut ctx, 2).unwrap();
        assert_eq!(service.list_achievements().unwrap().len(), 1);
        let logs = service.list_action_logs().unwrap();
        assert_eq!(logs[0].action, "delete_achievement");
    }
}
