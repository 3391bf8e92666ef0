use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::webserver::state::AppState;

/// GET /api/status - liveness summary for dashboards and probes
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "uptime_seconds": state.uptime_seconds(),
        "live_sessions": state.registry.stats().await,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
