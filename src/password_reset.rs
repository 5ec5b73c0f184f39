use crate::auth_ops::hash_password;
use crate::logging::log_action;
use crate::services::{PortalContext, PortalError, PortalService, ServiceResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Reset links stay valid for one hour.
pub const TOKEN_TTL_MINUTES: i64 = 60;

/// Sign a reset token for the admin's email. The expiry rides inside the
/// token so no server-side state is needed between request and redeem.
pub fn create_reset_token(
    secret: &str,
    admin_id: i64,
    email: &str,
    expires_at: DateTime<Utc>,
) -> String {
    let message = format!("{} {} {}", admin_id, email, expires_at.timestamp());
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC valid");
    mac.update(message.as_bytes());
    let mut bytes = mac.finalize().into_bytes().to_vec();
    bytes.truncate(16);
    format!(
        "{}.{}",
        expires_at.timestamp(),
        URL_SAFE_NO_PAD.encode(bytes)
    )
}

fn verify_reset_token(secret: &str, admin_id: i64, email: &str, token: &str) -> bool {
    let Some((timestamp, _signature)) = token.split_once('.') else {
        return false;
    };
    let Ok(timestamp) = timestamp.parse::<i64>() else {
        return false;
    };
    let Some(expires_at) = DateTime::<Utc>::from_timestamp(timestamp, 0) else {
        return false;
    };
    if expires_at < Utc::now() {
        return false;
    }
    token == create_reset_token(secret, admin_id, email, expires_at)
}

/// First half of the flow: the admin asks for a reset link. Always reports
/// success to the caller; whether the address exists is not revealed. The
/// link itself lands in the context for the mail layer.
pub fn request_reset<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    email: &str,
) -> ServiceResult<()> {
    if let Some(admin) = service.find_admin_by_email(email)? {
        let secret = service.reset_secret()?;
        let expires_at = Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES);
        let token = create_reset_token(&secret, admin.id, &admin.email, expires_at);
        ctx.context.set(
            "reset_link",
            format!(
                "{}/reset-password?id={}&token={}",
                ctx.scripturl, admin.id, token
            ),
        );
        log_action(service, ctx, "request_password_reset", json!({ "id": admin.id }))?;
    }
    Ok(())
}

/// Second half: redeem the token and store the new password hash.
pub fn redeem_reset<S: PortalService>(
    service: &S,
    ctx: &mut PortalContext,
    admin_id: i64,
    token: &str,
    new_password: &str,
) -> ServiceResult<()> {
    let secret = service.reset_secret()?;
    let admin = service
        .get_admin(admin_id)?
        .ok_or_else(|| PortalError::invalid("token", "tautan tidak valid"))?;
    if !verify_reset_token(&secret, admin.id, &admin.email, token) {
        return Err(PortalError::invalid("token", "tautan tidak valid"));
    }
    let hash = hash_password(new_password)?;
    service.update_admin_password(admin.id, &hash)?;
    log_action(service, ctx, "redeem_password_reset", json!({ "id": admin.id }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth_ops::validate_login;
    use crate::services::InMemoryService;

    #[test]
    fn token_round_trip() {
        let secret = "reset_secret_key";
        let expires_at = Utc::now() + Duration::minutes(30);
        let token = create_reset_token(secret, 1, "admin@kampus.ac.id", expires_at);
        assert!(verify_reset_token(secret, 1, "admin@kampus.ac.id", &token));
        assert!(!verify_reset_token(secret, 2, "admin@kampus.ac.id", &token));
        assert!(!verify_reset_token(secret, 1, "lain@kampus.ac.id", &token));
    }

    #[test]
    fn expired_token_rejected() {
        let secret = "reset_secret_key";
        let expired = Utc::now() - Duration::minutes(1);
        let token = create_reset_token(secret, 1, "admin@kampus.ac.id", expired);
        assert!(!verify_reset_token(secret, 1, "admin@kampus.ac.id", &token));
    }

    #[test]
    fn request_builds_link_for_known_email() {
        let service = InMemoryService::default();
        let mut ctx = PortalContext::default();
        ctx.scripturl = "https://kemahasiswaan.kampus.ac.id".into();
        request_reset(&service, &mut ctx, "admin@kampus.ac.id").unwrap();
        let link = ctx.context.string("reset_link").unwrap();
        assert!(link.contains("/reset-password?id=1&token="));
    }

    #[test]
    fn unknown_email_stays_silent() {
        let service = InMemoryService::default();
        let mut ctx = PortalContext::default();
        request_reset(&service, &mut ctx, "tidakada@kampus.ac.id").unwrap();
        assert!(ctx.context.string("reset_link").is_none());
    }

    #[test]
    fn redeem_updates_password() {
        let service = InMemoryService::default();
        let mut ctx = PortalContext::default();
        let secret = service.reset_secret().unwrap();
        let token = create_reset_token(
            &secret,
            1,
            "admin@kampus.ac.id",
            Utc::now() + Duration::minutes(10),
        );
        redeem_reset(&service, &mut ctx, 1, &token, "sandi-baru-aman").unwrap();
        let mut login_ctx = PortalContext::default();
        assert!(
            validate_login(&service, &mut login_ctx, "admin@kampus.ac.id", "sandi-baru-aman")
                .is_ok()
        );
        assert!(
            validate_login(&service, &mut login_ctx, "admin@kampus.ac.id", "rahasia123").is_err()
        );
    }

    #[test]
    fn tampered_token_rejected() {
        let service = InMemoryService::default();
        let mut ctx = PortalContext::default();
        let result = redeem_reset(&service, &mut ctx, 1, "12345.palsu", "sandi-baru-aman");
        assert!(matches!(result, Err(PortalError::Validation(_))));
    }
}
