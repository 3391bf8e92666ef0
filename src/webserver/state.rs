use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenValidator;
use crate::config::Config;
use crate::webserver::ws::ConnectionRegistry;

/// Shared state handed to every route handler
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<ConnectionRegistry>,
    pub validator: Arc<dyn TokenValidator>,
    pub startup_time: Instant,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        registry: Arc<ConnectionRegistry>,
        validator: Arc<dyn TokenValidator>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            registry,
            validator,
            startup_time: Instant::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.startup_time.elapsed().as_secs()
    }
}
