use crate::services::{
    AdminRecord, PortalContext, PortalError, PortalService, ServiceResult,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password for storage (Argon2id).
pub fn hash_password(password: &str) -> ServiceResult<String> {
    if password.trim().len() < 8 {
        return Err(PortalError::invalid(
            "password",
            "kata sandi minimal 8 karakter",
        ));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PortalError::Internal(format!("hash_password failed: {e}")))?
        .to_string();
    Ok(hash)
}

fn verify_password_hash(password: &str, stored: &str) -> bool {
    if stored.is_empty() {
        return false;
    }
    if stored.starts_with("$argon2") {
        if let Ok(parsed) = PasswordHash::new(stored) {
            return Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok();
        }
    }
    password == stored
}

/// Validate a login form against the stored admin record and load the admin
/// into the request context.
pub fn validate_login<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    email: &str,
    password: &str,
) -> ServiceResult<AdminRecord> {
    let admin = service
        .find_admin_by_email(email)?
        .ok_or_else(|| PortalError::PermissionDenied("unknown_admin".into()))?;
    if !verify_password_hash(password, &admin.password) {
        return Err(PortalError::PermissionDenied("bad_password".into()));
    }
    load_admin_into_context(ctx, &admin);
    Ok(admin)
}

pub fn load_admin_into_context(ctx: &mut PortalContext, admin: &AdminRecord) {
    ctx.user_info.id = admin.id;
    ctx.user_info.name = admin.name.clone();
    ctx.user_info.email = admin.email.clone();
    ctx.user_info.is_guest = false;
    ctx.user_info.is_admin = true;
}

pub fn logout(ctx: &mut PortalContext) {
    ctx.user_info = Default::default();
    ctx.session.remove("flash");
}
