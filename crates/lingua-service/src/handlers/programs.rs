//! Program catalog handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use lingua_core::{
    normalize_email, popular_limit, popular_programs, NewProgram, Program, ProgramId,
    ProgramStatus,
};
use lingua_store::Store;

use crate::auth::AdminGate;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Query for the popular rankings.
#[derive(Debug, Default, Deserialize)]
pub struct PopularQuery {
    /// Maximum number of results (default 6, capped at 50).
    pub limit: Option<usize>,
}

/// Status update request.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// New status: pending, approved or denied.
    pub status: String,
}

/// Feedback update request.
#[derive(Debug, Deserialize)]
pub struct SetFeedbackRequest {
    /// Admin feedback text.
    pub feedback: String,
}

/// List all programs.
pub async fn list_programs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Program>>, ApiError> {
    Ok(Json(state.store.list_programs()?))
}

/// Submit a new program for review.
pub async fn create_program(
    State(state): State<Arc<AppState>>,
    ApiJson(mut body): ApiJson<NewProgram>,
) -> Result<Json<Program>, ApiError> {
    body.validate()?;
    body.instructor_email = normalize_email(&body.instructor_email)?;

    let program = Program::submit(body);
    state.store.put_program(&program)?;

    tracing::info!(
        program_id = %program.id,
        instructor = %program.instructor_email,
        "Program submitted"
    );

    Ok(Json(program))
}

/// Programs with the most enrolled students.
pub async fn popular(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PopularQuery>,
) -> Result<Json<Vec<Program>>, ApiError> {
    let programs = state.store.list_programs()?;
    Ok(Json(popular_programs(programs, popular_limit(query.limit))))
}

/// Programs taught by the instructor with this email.
pub async fn by_instructor(
    State(state): State<Arc<AppState>>,
    ApiPath(email): ApiPath<String>,
) -> Result<Json<Vec<Program>>, ApiError> {
    let email = normalize_email(&email)?;
    Ok(Json(state.store.list_programs_by_instructor(&email)?))
}

/// A single program.
pub async fn get_program(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<ProgramId>,
) -> Result<Json<Program>, ApiError> {
    state
        .store
        .get_program(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("program {id} not found")))
}

/// Approve or deny a program.
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    admin: AdminGate,
    ApiPath(id): ApiPath<ProgramId>,
    ApiJson(body): ApiJson<SetStatusRequest>,
) -> Result<Json<Program>, ApiError> {
    let status: ProgramStatus = body.status.parse()?;
    let program = state.store.set_program_status(&id, status)?;

    tracing::info!(
        program_id = %id,
        status = %status,
        admin = ?admin.admin_email,
        "Program status updated"
    );

    Ok(Json(program))
}

/// Attach admin feedback to a program.
pub async fn set_feedback(
    State(state): State<Arc<AppState>>,
    admin: AdminGate,
    ApiPath(id): ApiPath<ProgramId>,
    ApiJson(body): ApiJson<SetFeedbackRequest>,
) -> Result<Json<Program>, ApiError> {
    let program = state.store.set_program_feedback(&id, body.feedback.trim())?;

    tracing::info!(program_id = %id, admin = ?admin.admin_email, "Program feedback updated");

    Ok(Json(program))
}
