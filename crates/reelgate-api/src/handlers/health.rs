//! Health and readiness probes

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Key the readiness check looks up; it does not have to exist, the lookup
/// just has to reach the backend.
const READINESS_KEY: &str = "media/.readiness";

/// Combined health endpoint
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "reelgate",
    }))
}

/// Liveness probe: the process is up and serving.
pub async fn live() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe: registry and event bus are in-process, so the storage
/// backend is the only dependency worth checking.
pub async fn ready(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.storage.exists(READINESS_KEY).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(err) => {
            tracing::error!(error = %err, "Storage backend failed readiness check");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
