/// In-process broker implementation
///
/// Backs the binary and the test suite. Pattern subscriptions are held
/// behind one async Mutex; publish walks the list, delivers to every
/// matching live subscription and prunes subscriptions whose receiver was
/// dropped.
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::arguments::is_debug_broker_enabled;
use crate::errors::BrokerError;
use crate::logger::{self, LogTag};

use super::{Broker, RawMessage};

struct PatternSubscription {
    pattern: String,
    sender: mpsc::UnboundedSender<RawMessage>,
}

#[derive(Default)]
pub struct MemoryBroker {
    subscriptions: Mutex<Vec<PatternSubscription>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live pattern subscriptions (diagnostic)
    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.lock().await.len()
    }
}

/// Match a channel against a subscription pattern
///
/// Supports the single trailing-wildcard form (`logs:*`) the engine uses;
/// anything else is an exact match.
fn pattern_matches(pattern: &str, channel: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => channel.starts_with(prefix),
        None => pattern == channel,
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn publish(&self, channel: &str, payload: String) -> Result<(), BrokerError> {
        let mut subscriptions = self.subscriptions.lock().await;

        let mut delivered = 0usize;
        subscriptions.retain(|sub| {
            if !pattern_matches(&sub.pattern, channel) {
                return true;
            }
            let message = RawMessage {
                channel: channel.to_string(),
                payload: payload.clone(),
            };
            match sub.sender.send(message) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                // Receiver dropped: subscription ended
                Err(_) => false,
            }
        });

        if is_debug_broker_enabled() {
            logger::debug(
                LogTag::Broker,
                &format!("published to '{}' (subscriptions={})", channel, delivered),
            );
        }

        Ok(())
    }

    async fn pattern_subscribe(
        &self,
        pattern: &str,
    ) -> Result<mpsc::UnboundedReceiver<RawMessage>, BrokerError> {
        let (tx, rx) = mpsc::unbounded_channel();

        self.subscriptions.lock().await.push(PatternSubscription {
            pattern: pattern.to_string(),
            sender: tx,
        });

        logger::info(
            LogTag::Broker,
            &format!("pattern subscription established: '{}'", pattern),
        );

        Ok(rx)
    }
}
