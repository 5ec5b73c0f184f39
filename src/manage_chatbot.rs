use crate::flash::set_flash;
use crate::listing::Listable;
use crate::logging::log_action;
use crate::notification::Severity;
use crate::security::{ensure_permission, guard_mutation};
use crate::services::{
    ChatbotRuleRecord, PortalContext, PortalError, PortalService, ServiceResult,
};
use crate::validation::FormValidator;
use serde_json::json;

pub const PERMISSION: &str = "manage_chatbot";

impl Listable for ChatbotRuleRecord {
    fn key(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.keyword.clone(), self.reply.clone()]
    }
}

pub fn list_chatbot_rules<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<()> {
    ensure_permission(ctx, PERMISSION)?;
    let rows = service.list_chatbot_rules()?;
    ctx.context.set(
        "chatbot_rules",
        rows.iter()
            .map(|row| {
                json!({
                    "id": row.id,
                    "keyword": row.keyword,
                    "reply": row.reply,
                    "display_order": row.display_order,
                    "active": row.active,
                })
            })
            .collect::<Vec<_>>(),
    );
    ctx.context
        .set("chatbot_fallback", service.chatbot_fallback()?);
    Ok(())
}

pub fn save_chatbot_rule<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<i64> {
    guard_mutation(service, ctx, PERMISSION)?;
    let mut validator = FormValidator::new();
    let keyword = validator.required(&ctx.post_vars, "keyword");
    validator.max_len("keyword", &keyword, 60);
    let reply = validator.required(&ctx.post_vars, "reply");
    validator.max_len("reply", &reply, 1000);
    validator.finish()?;
    let id = ctx.post_vars.int("id").unwrap_or(0);
    let display_order = match ctx.post_vars.int("display_order") {
        Some(order) if order > 0 => order as i32,
        _ => {
            service
                .list_chatbot_rules()?
                .iter()
                .map(|rule| rule.display_order)
                .max()
                .unwrap_or(0)
                + 1
        }
    };
    let record = ChatbotRuleRecord {
        id,
        keyword,
        reply,
        display_order,
        active: ctx.post_vars.bool("active"),
    };
    let id = service.save_chatbot_rule(record)?;
    log_action(service, ctx, "save_chatbot_rule", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Aturan chatbot berhasil disimpan");
    Ok(id)
}

pub fn destroy_chatbot_rule<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    service.delete_chatbot_rule(id)?;
    log_action(service, ctx, "delete_chatbot_rule", json!({ "id": id }))?;
    set_flash(ctx, Severity::Success, "Aturan chatbot berhasil dihapus");
    Ok(())
}

pub fn toggle_chatbot_rule<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    id: i64,
) -> ServiceResult<bool> {
    guard_mutation(service, ctx, PERMISSION)?;
    let rule = service
        .list_chatbot_rules()?
        .into_iter()
        .find(|rule| rule.id == id)
        .ok_or_else(|| PortalError::NotFound(format!("chatbot rule {id}")))?;
    let next = !rule.active;
    service.set_chatbot_rule_active(id, next)?;
    log_action(
        service,
        ctx,
        "toggle_chatbot_rule",
        json!({ "id": id, "active": next }),
    )?;
    Ok(next)
}

pub fn save_chatbot_fallback<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
) -> ServiceResult<()> {
    guard_mutation(service, ctx, PERMISSION)?;
    let mut validator = FormValidator::new();
    let reply = validator.required(&ctx.post_vars, "fallback");
    validator.max_len("fallback", &reply, 1000);
    validator.finish()?;
    service.set_chatbot_fallback(&reply)?;
    log_action(service, ctx, "save_chatbot_fallback", json!({}))?;
    set_flash(ctx, Severity::Success, "Jawaban default berhasil disimpan");
    Ok(())
}
