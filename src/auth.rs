use std::env;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims carried by an admin session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    pub sub: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

/// Rejection type returned when auth fails.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    MissingSecret,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use axum::http::StatusCode;
        let status = match self {
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::MissingSecret => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let msg = match self {
            AuthError::MissingToken => "missing bearer token",
            AuthError::InvalidToken => "invalid token",
            AuthError::MissingSecret => "server jwt secret not configured",
        };
        (status, msg).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        use axum::{
            headers::{authorization::Bearer, Authorization},
            RequestPartsExt, TypedHeader,
        };
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingToken)?;

        let secret = env::var("JWT_SECRET").map_err(|_| AuthError::MissingSecret)?;

        let token_data = decode::<AuthClaims>(
            bearer.token(),
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        Ok(token_data.claims)
    }
}

/// Issue a session token for a signed-in admin, valid for eight hours.
pub fn issue_token(admin_id: i64, name: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = AuthClaims {
        sub: admin_id.to_string(),
        name: name.to_string(),
        exp: now + 8 * 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_decodes() {
        let token = issue_token(1, "Admin Kemahasiswaan", "test_secret").unwrap();
        let decoded = decode::<AuthClaims>(
            &token,
            &DecodingKey::from_secret(b"test_secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, "1");
        assert_eq!(decoded.claims.name, "Admin Kemahasiswaan");
    }

    #[test]
    fn wrong_secret_fails() {
        let token = issue_token(1, "Admin", "test_secret").unwrap();
        let decoded = decode::<AuthClaims>(
            &token,
            &DecodingKey::from_secret(b"other_secret"),
            &Validation::default(),
        );
        assert!(decoded.is_err());
    }
}
