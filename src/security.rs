use crate::services::{
    PortalContext, PortalError, PortalService, ServiceResult, SessionCheckMode,
};

pub fn ensure_permission(ctx: &PortalContext, permission: &str) -> ServiceResult<()> {
    if ctx.user_info.is_admin || ctx.user_info.permissions.contains(permission) {
        Ok(())
    } else {
        Err(PortalError::PermissionDenied(permission.into()))
    }
}

/// Gate every admin mutation: the caller must hold the permission and carry a
/// live session. Destructive handlers call this with [`SessionCheckMode::Post`].
pub fn guard_mutation<S: PortalService>(
    service: &S,
    ctx: &PortalContext,
    permission: &str,
) -> ServiceResult<()> {
    ensure_permission(ctx, permission)?;
    service.check_session(ctx, SessionCheckMode::Post)
}

pub fn require_login(ctx: &PortalContext) -> ServiceResult<()> {
    if ctx.user_info.is_guest {
        Err(PortalError::PermissionDenied("login_required".into()))
    } else {
        Ok(())
    }
}
