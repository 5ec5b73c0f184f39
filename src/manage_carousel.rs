use crate::flash::set_flash;
use crate::listing::Listable;
use crate::logging::log_action;
use crate::notification::Severity;
use crate::security::{ensure_permission, guard_mutation};
use crate::services::{
    CarouselSlideRecord, PortalContext, PortalError, PortalService, ServiceResult,
};
use crate::uploads::AttachmentField;
use crate::validation::FormValidator;
use serde_json::json;

pub const PERMISSION: &str = "manage_carousel";

impl Listable for CarouselSlideRecord {
    fn key(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.title.clone()]
    }
}

pub fn list_carousel_slides<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<()> {
    ensure_permission(ctx, PERMISSION)?;
    let rows = service.list_carousel_slides()?;
    ctx.context.set(
        "carousel_slides",
        rows.iter()
            .map(|row| {
                json!({
                    "id": row.id,
                    "title": row.title,
                    "image": row.image,
                    "display_order": row.display_order,
                    "active": row.active,
                })
            })
            .collect::<Vec<_>>(),
    );
    Ok(())
}

pub fn save_carousel_slide<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    image: &AttachmentField,
) -> ServiceResult<i64> {
    guard_mutation(service, ctx, PERMISSION)?;
    let mut validator = FormValidator::new();
    let title = validator.required(&ctx.post_vars, "title");
    validator.max_len("title", &title, 120);
    let id = ctx.post_vars.int("id").unwrap_or(0);
    // A brand-new slide must carry its banner image; edits may keep the old one.
    if id == 0 && !image.has_file() {
        validator.push("image", "wajib diisi");
    }
    image.validate(&mut validator);
    validator.finish()?;
    let mut record = CarouselSlideRecord {
        id,
        title,
        image: None,
        display_order: ctx.post_vars.int("display_order").unwrap_or(0) as i32,
        active: ctx.post_vars.bool("active"),
    };
    if record.id > 0 {
        record.image = service
            .list_carousel_slides()?
            .into_iter()
            .find(|slide| slide.id == record.id)
            .and_then(|slide| slide.image);
    }
    if record.display_order == 0 {
        record.display_order = next_display_order(service)?;
    }
    if let Some(stored) = image.store(service)? {
        record.image = Some(stored);
    }
    let id = service.save_carousel_slide(record)?;
    log_action(service, ctx, "save_carousel_slide", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Banner berhasil disimpan");
    Ok(id)
}

fn next_display_order<S: PortalService>(service: &S) -> ServiceResult<i32> {
    Ok(service
        .list_carousel_slides()?
        .iter()
        .map(|slide| slide.display_order)
        .max()
        .unwrap_or(0)
        + 1)
}

pub fn destroy_carousel_slide<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    service.delete_carousel_slide(id)?;
    log_action(service, ctx, "delete_carousel_slide", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Banner berhasil dihapus");
    Ok(())
}

pub fn toggle_carousel_slide<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
) -> ServiceResult<bool> {
    guard_mutation(service, ctx, PERMISSION)?;
    let slide = service
        .list_carousel_slides()?
        .into_iter()
        .find(|slide| slide.id == id)
        .ok_or_else(|| PortalError::NotFound(format!("carousel slide {id}")))?;
    let next = !slide.active;
    service.set_carousel_active(id, next)?;
    log_action(
        service,
        ctx,
        "toggle_carousel_slide",
        json!({ "id": id, "active": next }),
    )?;
    set_flash(
        ctx,
        Severity::Success,
        if next {
            "Banner diaktifkan"
        } else {
            "Banner dinonaktifkan"
        },
    );
    Ok(next)
}

/// Swap a slide one step up or down in the display order.
pub fn move_carousel_slide<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
    up: bool,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    let slides = service.list_carousel_slides()?;
    let position = slides
        .iter()
        .position(|slide| slide.id == id)
        .ok_or_else(|| PortalError::NotFound(format!("carousel slide {id}")))?;
    let neighbor = if up {
        position.checked_sub(1)
    } else if position + 1 < slides.len() {
        Some(position + 1)
    } else {
        None
    };
    let Some(neighbor) = neighbor else {
        return Ok(());
    };
    let mut a = slides[position].clone();
    let mut b = slides[neighbor].clone();
    std::mem::swap(&mut a.display_order, &mut b.display_order);
    service.save_carousel_slide(a)?;
    service.save_carousel_slide(b)?;
    log_action(service, ctx, "reorder_carousel", json!({ "id": id, "up": up }))?;
    Ok(())
}
