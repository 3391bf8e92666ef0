/// Publish/subscribe broker seam
///
/// The engine only requires two operations from its message bus: exact-
/// channel publish and wildcard pattern subscription. Delivery contract:
/// at-most-once per subscription, FIFO within a single channel, no ordering
/// across channels, no persistence of undelivered messages.
pub mod memory;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::BrokerError;

pub use memory::MemoryBroker;

/// One message as delivered to a pattern subscription
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub channel: String,
    pub payload: String,
}

/// Publish/subscribe message bus
#[async_trait]
pub trait Broker: Send + Sync {
    /// Publish a payload to an exact channel
    async fn publish(&self, channel: &str, payload: String) -> Result<(), BrokerError>;

    /// Subscribe to a family of channels by wildcard pattern
    ///
    /// Returns the receiving end of the subscription; messages arrive in
    /// publish order per channel. Dropping the receiver ends the
    /// subscription.
    async fn pattern_subscribe(
        &self,
        pattern: &str,
    ) -> Result<mpsc::UnboundedReceiver<RawMessage>, BrokerError>;
}

/// Channel naming shared by publisher and router
pub mod channels {
    /// Pattern covering every per-user log channel
    pub const LOGS_PATTERN: &str = "logs:*";
    /// Pattern covering every per-user trace channel
    pub const TRACES_PATTERN: &str = "traces:*";

    pub fn log_channel(user_id: &str) -> String {
        format!("logs:{}", user_id)
    }

    pub fn trace_channel(user_id: &str) -> String {
        format!("traces:{}", user_id)
    }
}
