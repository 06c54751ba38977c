//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub cached_days: usize,
}

/// GET /health - Liveness probe, no credential required.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "citytemp",
        version: env!("CARGO_PKG_VERSION"),
        cached_days: state.cache.len(),
    })
}
