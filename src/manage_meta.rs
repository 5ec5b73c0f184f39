use crate::flash::set_flash;
use crate::listing::Listable;
use crate::logging::log_action;
use crate::notification::Severity;
use crate::security::{ensure_permission, guard_mutation};
use crate::services::{PortalContext, PortalService, SeoMetaRecord, ServiceResult};
use crate::validation::FormValidator;
use serde_json::json;

pub const PERMISSION: &str = "manage_meta";

impl Listable for SeoMetaRecord {
    fn key(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.page_key.clone(), self.title.clone()]
    }
}

pub fn list_seo_meta<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<()> {
    ensure_permission(ctx, PERMISSION)?;
    let rows = service.list_seo_meta()?;
    ctx.context.set(
        "seo_meta",
        rows.iter()
            .map(|row| {
                json!({
                    "id": row.id,
                    "page_key": row.page_key,
                    "title": row.title,
                    "description": row.description,
                    "keywords": row.keywords,
                })
            })
            .collect::<Vec<_>>(),
    );
    Ok(())
}

pub fn save_seo_meta<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<i64> {
    guard_mutation(service, ctx, PERMISSION)?;
    let mut validator = FormValidator::new();
    let page_key = validator.required(&ctx.post_vars, "page_key");
    validator.max_len("page_key", &page_key, 60);
    let title = validator.required(&ctx.post_vars, "title");
    validator.max_len("title", &title, 70);
    let description = validator.optional(&ctx.post_vars, "description");
    validator.max_len("description", &description, 160);
    let keywords = validator.optional(&ctx.post_vars, "keywords");
    validator.max_len("keywords", &keywords, 255);
    validator.finish()?;
    let record = SeoMetaRecord {
        id: ctx.post_vars.int("id").unwrap_or(0),
        page_key,
        title,
        description,
        keywords,
    };
    let id = service.save_seo_meta(record)?;
    log_action(service, ctx, "save_seo_meta", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Metadata berhasil disimpan");
    Ok(id)
}

pub fn destroy_seo_meta<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    service.delete_seo_meta(id)?;
    log_action(service, ctx, "delete_seo_meta", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Metadata berhasil dihapus");
    Ok(())
}

/// Public head-tag lookup for a rendered page, falling back to the site
/// defaults when the key has no entry.
pub fn page_meta<S: PortalService>(
    service: &S,
    page_key: &str,
) -> ServiceResult<SeoMetaRecord> {
    match service.get_seo_meta(page_key)? {
        Some(meta) => Ok(meta),
        None => Ok(SeoMetaRecord {
            id: 0,
            page_key: page_key.to_string(),
            title: "Kemahasiswaan".into(),
            description: String::new(),
            keywords: String::new(),
        }),
    }
}
