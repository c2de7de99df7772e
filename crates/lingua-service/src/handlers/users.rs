//! User handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use lingua_core::{normalize_email, Role, User, UserId, ROLE_NONE};
use lingua_store::Store;

use crate::auth::AdminGate;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// User response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID.
    pub id: String,
    /// Email.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Profile photo URL.
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    /// Role.
    pub role: String,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            photo_url: user.photo_url.clone(),
            role: user.role.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Sign-in registration request.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Email.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Profile photo URL.
    #[serde(default, rename = "photoURL", alias = "photo_url")]
    pub photo_url: Option<String>,
}

/// Role lookup response.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    /// Email that was looked up.
    pub email: String,
    /// Role name, or `"none"` for unknown emails.
    pub role: String,
}

/// Role update request.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    /// New role.
    pub role: String,
}

/// List all users.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.store.list_users()?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// Register a user on first sign-in. New users are students.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let email = normalize_email(&body.email)?;
    let user = User::new(email, body.name, body.photo_url);

    state.store.insert_user(&user)?;
    tracing::info!(user_id = %user.id, email = %user.email, "User created");

    Ok(Json(UserResponse::from(&user)))
}

/// Look up the role for an email.
pub async fn get_role(
    State(state): State<Arc<AppState>>,
    ApiPath(email): ApiPath<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    let role = match normalize_email(&email) {
        Ok(normalized) => state
            .store
            .find_user_by_email(&normalized)?
            .map_or_else(|| ROLE_NONE.to_string(), |u| u.role.to_string()),
        Err(_) => ROLE_NONE.to_string(),
    };

    Ok(Json(RoleResponse { email, role }))
}

/// Change a user's role.
pub async fn set_role(
    State(state): State<Arc<AppState>>,
    admin: AdminGate,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(body): ApiJson<SetRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let role: Role = body.role.parse()?;
    let user = state.store.set_user_role(&id, role)?;

    tracing::info!(
        user_id = %id,
        role = %role,
        admin = ?admin.admin_email,
        "User role updated"
    );

    Ok(Json(UserResponse::from(&user)))
}
