use crate::flash::set_flash;
use crate::logging::log_action;
use crate::notification::Severity;
use crate::security::{ensure_permission, guard_mutation};
use crate::services::{AspirationRecord, PortalContext, PortalService, ServiceResult};
use crate::validation::FormValidator;
use serde_json::json;

pub const PERMISSION: &str = "manage_aspirations";
pub const PAGE_SIZE: usize = 10;

/// Admin index. Unlike the other screens this one paginates server-side: the
/// page links are opaque descriptors, and the client only posts back `start`.
pub fn list_aspirations<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<()> {
    ensure_permission(ctx, PERMISSION)?;
    let start = ctx.request.int("start").unwrap_or(0).max(0) as usize;
    let page = service.aspiration_page(start, PAGE_SIZE)?;
    ctx.context.set(
        "aspirations",
        page.entries
            .iter()
            .map(|row| {
                json!({
                    "id": row.id,
                    "sender_name": row.sender_name,
                    "email": row.email,
                    "subject": row.subject,
                    "body": row.body,
                    "is_read": row.is_read,
                    "created_at": row.created_at,
                })
            })
            .collect::<Vec<_>>(),
    );
    ctx.context.set("aspiration_total", page.total);
    ctx.context.set("aspiration_unread", page.unread);
    ctx.context.set("page_links", &page.page_links);
    Ok(())
}

/// Public submission endpoint: no login, but the form is validated the same
/// way admin forms are.
pub fn submit_aspiration<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<i64> {
    let mut validator = FormValidator::new();
    let sender_name = validator.required(&ctx.post_vars, "sender_name");
    validator.max_len("sender_name", &sender_name, 100);
    let email = validator.required(&ctx.post_vars, "email");
    if !email.contains('@') {
        validator.push("email", "alamat email tidak valid");
    }
    let subject = validator.required(&ctx.post_vars, "subject");
    validator.max_len("subject", &subject, 150);
    let body = validator.required(&ctx.post_vars, "body");
    validator.max_len("body", &body, 5000);
    validator.finish()?;
    let id = service.submit_aspiration(AspirationRecord {
        id: 0,
        sender_name,
        email,
        subject,
        body,
        is_read: false,
        created_at: None,
    })?;
    log_action(service, ctx, "submit_aspiration", json!({ "id": id }))?;
    set_flash(
        ctx,
        Severity::Success,
        "Terima kasih, aspirasi Anda telah terkirim",
    );
    Ok(id)
}

pub fn mark_aspiration_read<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
    read: bool,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    service.mark_aspiration_read(id, read)?;
    log_action(
        service,
        ctx,
        "mark_aspiration_read",
        json!({ "id": id, "read": read }),
    )?;
    Ok(())
}

pub fn destroy_aspiration<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    service.delete_aspiration(id)?;
    log_action(service, ctx, "delete_aspiration", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Aspirasi berhasil dihapus");
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

    #[test]
    fn index_pages_through_start() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        list_aspirations(&service, &mut ctx).unwrap();
        assert_eq!(ctx.context.int("aspiration_total"), Some(7));
        assert_eq!(
            ctx.context
                .get("aspirations")
                .unwrap()
                .as_array()
                .unwrap()
                .len(),
            7
        );
        assert_eq!(
            ctx.context
                .get("page_links")
                .unwrap()
                .as_array()
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn public_submission_needs_no_login() {
        let service = InMemoryService::default();
        let mut ctx = PortalContext::default();
        ctx.post_vars.set("sender_name", "Putri Amelia");
        ctx.post_vars.set("email", "putri@kampus.ac.id");
        ctx.post_vars.set("subject", "Jam layanan perpustakaan");
        ctx.post_vars.set("body", "Mohon jam layanan diperpanjang saat ujian.");
        let id = submit_aspiration(&service, &mut ctx).unwrap();
        assert!(id >= 8);
        assert!(ctx.session.contains("flash"));
    }

    #[test]
    fn invalid_email_is_field_error() {
        let service = InMemoryService::default();
        let mut ctx = PortalContext::default();
        ctx.post_vars.set("sender_name", "Putri");
        ctx.post_vars.set("email", "bukan-email");
        ctx.post_vars.set("subject", "Halo");
        ctx.post_vars.set("body", "Isi");
        let err = submit_aspiration(&service, &mut ctx).unwrap_err();
        match err {
            PortalError::Validation(errors) => {
                assert_eq!(errors.get("email"), Some("alamat email tidak valid"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mark_read_updates_unread_count() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        mark_aspiration_read(&service, &mut ctx, 3, true).unwrap();
        let page = service.aspiration_page(0, PAGE_SIZE).unwrap();
        assert_eq!(page.unread, 4);
    }

    #[test]
    fn destroy_shrinks_total() {
        let service = InMemoryService::default();
        let mut ctx = admin_ctx();
        destroy_aspiration(&service, &mut ctx, 1).unwrap();
        assert_eq!(service.aspiration_page(0, PAGE_SIZE).unwrap().total, 6);
    }
}
