//! Liveness and configuration report.

use axum::extract::State;
use axum::Json;

use crate::schema::health::HealthResponse;
use crate::state::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.service.health())
}
