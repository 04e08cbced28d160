use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use tracing::{debug, instrument};

use crate::models::AppState;

/// Liveness check. Answers `200 OK` with an empty body and touches neither
/// the store nor the mailer.
///
/// GET /health-check
#[instrument(skip_all)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> StatusCode {
    debug!(environment = ?state.config.environment, "Health check");
    StatusCode::OK
}
