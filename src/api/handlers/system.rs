//! System endpoints: health check, schedule parameters.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::QUESTION_RANGE;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` when the process answers.
    pub status: String,
    /// Server time, RFC-3339.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Registry backend in use.
    pub backend: String,
}

/// Parameters clients need to follow the question rotation on their own.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResponse {
    /// Bucket width in milliseconds.
    pub interval_ms: u64,
    /// Grace period added to each expiry, in milliseconds.
    pub margin_ms: u64,
    /// Origin of the bucket grid.
    pub epoch: DateTime<Utc>,
    /// Questions are numbered `0..question_range`.
    pub question_range: u32,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, registry backend and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            backend: state.rooms.backend_name().to_string(),
        }),
    )
}

/// `GET /config/schedule` — Bucket grid parameters.
#[utoipa::path(
    get,
    path = "/config/schedule",
    tag = "System",
    summary = "Question schedule",
    description = "Returns the interval, expiry margin and epoch of the question rotation.",
    responses(
        (status = 200, description = "Schedule parameters", body = ScheduleResponse),
    )
)]
pub async fn schedule_handler(State(state): State<AppState>) -> impl IntoResponse {
    let schedule = state.schedule;
    Json(ScheduleResponse {
        interval_ms: u64::try_from(schedule.interval().as_millis()).unwrap_or(u64::MAX),
        margin_ms: u64::try_from(schedule.margin().as_millis()).unwrap_or(u64::MAX),
        epoch: schedule.epoch(),
        question_range: QUESTION_RANGE,
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/schedule", get(schedule_handler))
}
