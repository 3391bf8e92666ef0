pub mod status;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::webserver::state::AppState;
use crate::webserver::ws;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "tracedeck telemetry server" }))
        .route("/api/status", get(status::get_status))
        .merge(ws::routes())
        .with_state(state)
}
