use crate::services::{PortalContext, PortalService, ServiceResult};

/// Append an audit entry attributed to the signed-in admin.
pub fn log_action<S: PortalService>(
    service: &S,
    ctx: &PortalContext,
    action: &str,
    details: serde_json::Value,
) -> ServiceResult<()> {
    let admin_id = if ctx.user_info.is_guest {
        None
    } else {
        Some(ctx.user_info.id)
    };
    service.log_action(action, admin_id, &details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryService;
    use serde_json::json;

    #[test]
    fn actions_are_attributed() {
        let service = InMemoryService::default();
        let mut ctx = PortalContext::default();
        ctx.user_info.id = 1;
        ctx.user_info.is_guest = false;
        log_action(&service, &ctx, "delete_achievement", json!({"id": 2})).unwrap();
        let logs = service.list_action_logs().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, "delete_achievement");
        assert_eq!(logs[0].admin_id, Some(1));
    }

    #[test]
    fn guest_actions_have_no_admin() {
        let service = InMemoryService::default();
        let ctx = PortalContext::default();
        log_action(&service, &ctx, "submit_aspiration", json!({})).unwrap();
        assert_eq!(service.list_action_logs().unwrap()[0].admin_id, None);
    }
}
