//! Authentication: access token issuing and extractors.
//!
//! Tokens are HS256 JWTs signed with the server secret. The claims are
//! whatever JSON object the client submitted to `/jwt`, plus `iat` and `exp`.
//!
//! This module provides extractors for:
//! - `AuthClaims` - a verified bearer token (protected routes)
//! - `AdminGate` - admin-only moderation routes, enforced when
//!   `ENFORCE_ADMIN_ROLES` is set

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use lingua_core::{normalize_email, Role};
use lingua_store::Store;

use crate::error::ApiError;
use crate::state::AppState;

/// Claim names set by the server; stripped from client payloads.
const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

/// Token claims: the client's payload plus issue and expiry times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Client-supplied claims, echoed back verbatim.
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiration time (Unix seconds).
    pub exp: i64,
}

impl Claims {
    /// The `email` claim, if present and a string.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.payload.get("email").and_then(serde_json::Value::as_str)
    }
}

/// Errors from token issuing and verification.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No signing secret configured.
    #[error("token signing is not configured")]
    NotConfigured,

    /// The token could not be created.
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// The token is malformed, tampered with, or expired.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Sign `payload` into a token valid for `ttl_seconds`.
///
/// # Errors
///
/// Returns `AuthError::Signing` if encoding fails.
pub fn issue_token(
    secret: &str,
    ttl_seconds: u64,
    mut payload: serde_json::Map<String, serde_json::Value>,
) -> Result<String, AuthError> {
    for claim in RESERVED_CLAIMS {
        payload.remove(claim);
    }

    let iat = chrono::Utc::now().timestamp();
    let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
    let claims = Claims {
        payload,
        iat,
        exp: iat.saturating_add(ttl),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AuthError::Signing)
}

/// Verify a token's signature and expiry and return its claims.
///
/// # Errors
///
/// Returns `AuthError::Invalid` if the token is malformed, signed with another
/// secret, or expired.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(AuthError::Invalid)
}

/// Extract the bearer token from request headers.
fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized)
}

fn verify_request(parts: &Parts, state: &AppState) -> Result<Claims, ApiError> {
    let token = bearer_token(parts)?;

    let secret = state.config.token_secret.as_deref().ok_or_else(|| {
        tracing::warn!("Rejecting bearer token: no token secret configured");
        ApiError::Unauthorized
    })?;

    verify_token(secret, token).map_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
        ApiError::Unauthorized
    })
}

/// Verified claims from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        verify_request(parts, state).map(Self)
    }
}

/// Admin check for moderation routes.
///
/// When `enforce_admin_roles` is off this extractor always succeeds with
/// `admin_email: None`. When on, it requires a valid bearer token whose
/// `email` claim belongs to a user with the admin role.
#[derive(Debug, Clone)]
pub struct AdminGate {
    /// The verified admin, when enforcement is on.
    pub admin_email: Option<String>,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminGate {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.enforce_admin_roles {
            return Ok(Self { admin_email: None });
        }

        let claims = verify_request(parts, state)?;
        let email = claims
            .email()
            .and_then(|e| normalize_email(e).ok())
            .ok_or(ApiError::Forbidden)?;

        let user = state.store.find_user_by_email(&email)?;
        if user.is_some_and(|u| u.role == Role::Admin) {
            tracing::info!(admin = %email, "Admin authenticated");
            Ok(Self {
                admin_email: Some(email),
            })
        } else {
            tracing::debug!(email = %email, "Non-admin rejected from moderation route");
            Err(ApiError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn token_round_trip_echoes_payload() {
        let token = issue_token("secret", 3600, payload(json!({"email": "a@x.com", "n": 1}))).unwrap();
        let claims = verify_token("secret", &token).unwrap();

        assert_eq!(claims.email(), Some("a@x.com"));
        assert_eq!(claims.payload["n"], 1);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn client_cannot_choose_expiry() {
        let token = issue_token("secret", 60, payload(json!({"exp": i64::MAX}))).unwrap();
        let claims = verify_token("secret", &token).unwrap();

        assert_eq!(claims.exp - claims.iat, 60);
        assert!(!claims.payload.contains_key("exp"));
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue_token("secret", 3600, payload(json!({"email": "a@x.com"}))).unwrap();
        assert!(matches!(
            verify_token("other", &token),
            Err(AuthError::Invalid(_))
        ));
    }

    #[test]
    fn expired_token_rejected() {
        let iat = chrono::Utc::now().timestamp() - 7200;
        let claims = Claims {
            payload: payload(json!({"email": "a@x.com"})),
            iat,
            exp: iat + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(verify_token("secret", &token).is_err());
    }

    #[test]
    fn garbage_rejected() {
        assert!(verify_token("secret", "not-a-token").is_err());
    }
}
