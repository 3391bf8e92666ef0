/// Axum webserver implementation
///
/// Main server lifecycle management including startup, shutdown, and graceful termination
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::cors::CorsLayer;

use anyhow::{anyhow, Context, Result};

use crate::{
    logger::{self, LogTag},
    webserver::{routes, state::AppState},
};

/// Global shutdown notifier
static SHUTDOWN_NOTIFY: once_cell::sync::Lazy<Arc<Notify>> =
    once_cell::sync::Lazy::new(|| Arc::new(Notify::new()));

/// Start the webserver
///
/// This function blocks until the server is shut down
pub async fn start_server(state: Arc<AppState>) -> Result<()> {
    let bind = state.config.bind_address();
    logger::info(LogTag::Server, &format!("starting webserver on {}", bind));

    let app = build_app(Arc::clone(&state));

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", bind))?;

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        // Expand the common bind failures into something actionable
        match e.kind() {
            std::io::ErrorKind::AddrInUse => anyhow!(
                "failed to bind to {}: address already in use\n\
                 \n\
                 Another tracedeck instance (or another service) already owns\n\
                 this port. Stop it, or change server.port in the config file.",
                addr
            ),
            std::io::ErrorKind::PermissionDenied => anyhow!(
                "failed to bind to {}: permission denied\n\
                 \n\
                 Port {} requires elevated privileges on this system.\n\
                 Consider using a port above 1024 or running with appropriate permissions.",
                addr,
                addr.port()
            ),
            _ => anyhow!("failed to bind to {}: {}", addr, e),
        }
    })?;

    logger::info(
        LogTag::Server,
        &format!("listening on http://{} (ws://{}/ws/logs)", addr, addr),
    );

    let shutdown_signal = async {
        SHUTDOWN_NOTIFY.notified().await;
        logger::info(LogTag::Server, "received shutdown signal, stopping webserver");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("server error")?;

    logger::info(LogTag::Server, "webserver stopped gracefully");

    Ok(())
}

/// Trigger webserver shutdown
pub fn shutdown() {
    SHUTDOWN_NOTIFY.notify_one();
}

/// Build the Axum application with all routes and middleware
fn build_app(state: Arc<AppState>) -> axum::Router {
    // Dashboards are served from another origin during development
    routes::create_router(state).layer(CorsLayer::permissive())
}
