use crate::flash::set_flash;
use crate::listing::Listable;
use crate::logging::log_action;
use crate::notification::Severity;
use crate::security::{ensure_permission, guard_mutation};
use crate::services::{DirectorRecord, PortalContext, PortalError, PortalService, ServiceResult};
use crate::uploads::AttachmentField;
use crate::validation::FormValidator;
use serde_json::json;

pub const PERMISSION: &str = "manage_directors";

impl Listable for DirectorRecord {
    fn key(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.name.clone(), self.position.clone()]
    }
}

pub fn list_directors<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<()> {
    ensure_permission(ctx, PERMISSION)?;
    let rows = service.list_directors()?;
    ctx.context.set(
        "directors",
        rows.iter()
            .map(|row| {
                json!({
                    "id": row.id,
                    "name": row.name,
                    "position": row.position,
                    "photo": row.photo,
                    "display_order": row.display_order,
                })
            })
            .collect::<Vec<_>>(),
    );
    Ok(())
}

pub fn save_director<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    photo: &AttachmentField,
) -> ServiceResult<i64> {
    guard_mutation(service, ctx, PERMISSION)?;
    let mut validator = FormValidator::new();
    let name = validator.required(&ctx.post_vars, "name");
    validator.max_len("name", &name, 120);
    let position = validator.required(&ctx.post_vars, "position");
    validator.max_len("position", &position, 120);
    photo.validate(&mut validator);
    validator.finish()?;
    let mut record = DirectorRecord {
        id: ctx.post_vars.int("id").unwrap_or(0),
        name,
        position,
        photo: None,
        display_order: ctx.post_vars.int("display_order").unwrap_or(0) as i32,
    };
    if record.id > 0 {
        record.photo = service
            .list_directors()?
            .into_iter()
            .find(|director| director.id == record.id)
            .and_then(|director| director.photo);
    }
    if record.display_order == 0 {
        record.display_order = service
            .list_directors()?
            .iter()
            .map(|director| director.display_order)
            .max()
            .unwrap_or(0)
            + 1;
    }
    if let Some(stored) = photo.store(service)? {
        record.photo = Some(stored);
    }
    let id = service.save_director(record)?;
    log_action(service, ctx, "save_director", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Data pimpinan berhasil disimpan");
    Ok(id)
}

pub fn destroy_director<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    service.delete_director(id)?;
    log_action(service, ctx, "delete_director", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Data pimpinan berhasil dihapus");
    Ok(())
}

/// Swap a profile one step up or down on the public page.
pub fn move_director<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
    up: bool,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    let directors = service.list_directors()?;
    let position = directors
        .iter()
        .position(|director| director.id == id)
        .ok_or_else(|| PortalError::NotFound(format!("director {id}")))?;
    let neighbor = if up {
        position.checked_sub(1)
    } else if position + 1 < directors.len() {
        Some(position + 1)
    } else {
        None
    };
    let Some(neighbor) = neighbor else {
        return Ok(());
    };
    let mut a = directors[position].clone();
    let mut b = directors[neighbor].clone();
    std::mem::swap(&mut a.display_order, &mut b.display_order);
    service.save_director(a)?;
    service.save_director(b)?;
    log_action(service, ctx, "reorder_directors", json!({ "id": id, "up": up }))?;
    Ok(())
}
