//! Access token issuing.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::{issue_token, AuthError};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Token response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Signed bearer token.
    pub token: String,
}

/// Sign the submitted claims object into a bearer token.
pub async fn issue(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<TokenResponse>, ApiError> {
    let serde_json::Value::Object(claims) = body else {
        return Err(ApiError::BadRequest("token claims must be a JSON object".into()));
    };

    let secret = state
        .config
        .token_secret
        .as_deref()
        .ok_or(AuthError::NotConfigured)?;

    let token = issue_token(secret, state.config.token_ttl_seconds, claims)?;
    tracing::debug!("Access token issued");

    Ok(Json(TokenResponse { token }))
}
