//! Formula solving handler.

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::schema::solve::{SolveRequest, SolveResponse};
use crate::state::AppState;

/// Stages the formula, runs the solver and reports its verdict.
///
/// `POST /process_text`
pub async fn process_text(
    State(state): State<AppState>,
    Json(request): Json<SolveRequest>,
) -> Result<Json<SolveResponse>, ApiError> {
    let response = state.service.solve(request).await?;
    Ok(Json(response))
}
