//! Liveness endpoints for service monitoring.
//!
//! Gantry owns no persistent state, so there is no component check beyond
//! the process answering; both endpoints report the same thing.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::server::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// When the check was answered.
    pub timestamp: DateTime<Utc>,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
}

fn health_response(state: &AppState, status: &'static str) -> Response {
    let response = HealthResponse {
        status,
        timestamp: state.clock.now_utc(),
        service: "gantry-api",
        version: env!("CARGO_PKG_VERSION"),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Health check endpoint handler.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Response {
    debug!("Performing health check");
    health_response(&state, "healthy")
}

/// Liveness check endpoint for orchestration probes.
#[instrument(name = "liveness_check", skip(state))]
pub async fn liveness_check(State(state): State<AppState>) -> Response {
    debug!("Performing liveness check");
    health_response(&state, "alive")
}
