//! Migration commands
//!
//! - `POST /admin/migration/start`  start `migrate` | `cleanup` | `delete`
//! - `GET  /admin/migration/status` current state snapshot
//! - `POST /admin/migration/reset`  back to idle (409 while running)

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::{MigrationOperation, MigrationState};
use crate::services::StartOutcome;
use crate::AppState;

/// `POST /admin/migration/start` body; an empty body means `migrate`
#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub operation: MigrationOperation,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub reset: bool,
}

/// POST /admin/migration/start
///
/// 202 when accepted, 409 with `started: false` when an operation is already
/// running. Never waits for the operation itself.
pub async fn start_migration(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<StartOutcome>)> {
    let request: StartRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid start request: {}", e)))?
    };

    let outcome = state.orchestrator.start_operation(request.operation);
    let status = if outcome.started {
        StatusCode::ACCEPTED
    } else {
        StatusCode::CONFLICT
    };

    Ok((status, Json(outcome)))
}

/// GET /admin/migration/status
pub async fn migration_status(State(state): State<AppState>) -> Json<MigrationState> {
    Json(state.actor().state())
}

/// POST /admin/migration/reset
pub async fn reset_migration(State(state): State<AppState>) -> ApiResult<Json<ResetResponse>> {
    if state.actor().reset() {
        tracing::info!("Migration state reset");
        Ok(Json(ResetResponse { reset: true }))
    } else {
        Err(ApiError::Conflict(
            "Cannot reset while an operation is running".to_string(),
        ))
    }
}

/// Build migration routes (nested under `/admin`)
pub fn migration_routes() -> Router<AppState> {
    Router::new()
        .route("/migration/start", post(start_migration))
        .route("/migration/status", get(migration_status))
        .route("/migration/reset", post(reset_migration))
        .route("/migration/events", get(super::migration_event_stream))
}
