//! Health and liveness endpoint handlers.
//!
//! These handlers expose server health information for orchestrators
//! (Kubernetes, load balancers) and operational monitoring.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use super::AppState;

/// Returns health information as JSON: registered schema count and uptime.
pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let schemas = state.schemas.schema_names().len();
    let uptime_secs = state.start_time.elapsed().as_secs();

    Json(json!({
        "state": "ready",
        "schemas": schemas,
        "uptime_secs": uptime_secs,
    }))
}

/// Kubernetes liveness probe -- always returns 200 OK.
///
/// The liveness probe only checks whether the process is running and
/// responsive. It does not consult the connector, because a failed liveness
/// probe triggers a pod restart.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}
