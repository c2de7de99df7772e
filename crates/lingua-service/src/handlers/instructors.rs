//! Instructor handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use lingua_core::{popular_instructors, popular_limit, Instructor, RankedInstructor};
use lingua_store::Store;

use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::handlers::programs::PopularQuery;
use crate::state::AppState;

/// An instructor in the popularity ranking.
#[derive(Debug, Serialize)]
pub struct PopularInstructorResponse {
    /// The instructor profile.
    #[serde(flatten)]
    pub instructor: Instructor,
    /// Students enrolled across the instructor's programs.
    pub total_enrolled: u64,
    /// Number of programs the instructor teaches.
    pub program_count: usize,
}

impl From<RankedInstructor> for PopularInstructorResponse {
    fn from(ranked: RankedInstructor) -> Self {
        Self {
            instructor: ranked.instructor,
            total_enrolled: ranked.total_enrolled,
            program_count: ranked.program_count,
        }
    }
}

/// List all instructors.
pub async fn list_instructors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Instructor>>, ApiError> {
    Ok(Json(state.store.list_instructors()?))
}

/// Instructors ranked by enrollment across their programs.
pub async fn popular(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PopularQuery>,
) -> Result<Json<Vec<PopularInstructorResponse>>, ApiError> {
    let instructors = state.store.list_instructors()?;
    let programs = state.store.list_programs()?;

    let ranked = popular_instructors(instructors, &programs, popular_limit(query.limit));
    Ok(Json(ranked.into_iter().map(Into::into).collect()))
}
