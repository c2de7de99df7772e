//! Selected program handlers.
//!
//! A selection is a student's pending intent to enroll. At most one exists per
//! (email, program); it is removed when the student pays or unselects.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use lingua_core::{normalize_email, Program, ProgramId, SelectedProgram, SelectionId, WithProgram};
use lingua_store::Store;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// Selection response, joined with its program.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    /// Selection ID.
    pub id: String,
    /// Student email.
    pub email: String,
    /// Selected program ID.
    pub program_id: String,
    /// Created timestamp.
    pub created_at: String,
    /// The selected program; `null` if it no longer exists.
    pub program: Option<Program>,
}

impl From<WithProgram<SelectedProgram>> for SelectionResponse {
    fn from(joined: WithProgram<SelectedProgram>) -> Self {
        let WithProgram { record, program } = joined;
        Self {
            id: record.id.to_string(),
            email: record.email,
            program_id: record.program_id.to_string(),
            created_at: record.created_at.to_rfc3339(),
            program,
        }
    }
}

/// Select request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    /// Student email.
    pub email: String,
    /// Program to select.
    pub program_id: ProgramId,
}

/// Selections for a student.
pub async fn list_for_email(
    State(state): State<Arc<AppState>>,
    ApiPath(email): ApiPath<String>,
) -> Result<Json<Vec<SelectionResponse>>, ApiError> {
    let email = normalize_email(&email)?;
    let selections = state.store.list_selections_with_programs(&email)?;
    Ok(Json(selections.into_iter().map(Into::into).collect()))
}

/// A single selection.
pub async fn get_selection(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<SelectionId>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let selection = state
        .store
        .get_selection(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("selection {id} not found")))?;
    let program = state.store.get_program(&selection.program_id)?;

    Ok(Json(WithProgram::new(selection, program).into()))
}

/// Select a program. Fails with 409 if the student already selected it.
pub async fn select(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<SelectRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let email = normalize_email(&body.email)?;
    let program = state
        .store
        .get_program(&body.program_id)?
        .ok_or_else(|| ApiError::NotFound(format!("program {} not found", body.program_id)))?;

    let selection = SelectedProgram::new(email, body.program_id);
    state.store.insert_selection(&selection)?;

    tracing::info!(
        selection_id = %selection.id,
        email = %selection.email,
        program_id = %selection.program_id,
        "Program selected"
    );

    Ok(Json(WithProgram::new(selection, Some(program)).into()))
}

/// Remove a selection.
pub async fn unselect(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<SelectionId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_selection(&id)?;
    tracing::info!(selection_id = %id, "Selection removed");

    Ok(Json(serde_json::json!({
        "success": true,
        "id": id.to_string(),
    })))
}
