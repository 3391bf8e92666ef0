/// Channel router - bridges the broker's pattern subscriptions onto the
/// connection registry
///
/// The router owns exactly two subscriptions, `logs:*` and `traces:*`, each
/// drained by its own dispatch task so ordering is preserved per channel.
/// Either subscription failing to establish is fatal for startup; a broker
/// that cannot deliver subscriptions leaves every session silently dark.
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::arguments::is_debug_router_enabled;
use crate::broker::{channels, Broker, RawMessage};
use crate::errors::RouterError;
use crate::logger::{self, LogTag};
use crate::telemetry::Envelope;

use super::message::ServerMessage;
use super::registry::ConnectionRegistry;

pub struct ChannelRouter;

impl ChannelRouter {
    /// Subscribe to both telemetry patterns and spawn a dispatch task per
    /// subscription
    pub async fn start(
        broker: Arc<dyn Broker>,
        registry: Arc<ConnectionRegistry>,
    ) -> Result<(), RouterError> {
        for pattern in [channels::LOGS_PATTERN, channels::TRACES_PATTERN] {
            let rx = broker.pattern_subscribe(pattern).await?;
            logger::info(LogTag::Router, &format!("subscribed to {}", pattern));
            tokio::spawn(dispatch_loop(pattern, rx, Arc::clone(&registry)));
        }
        Ok(())
    }
}

/// Drain one pattern subscription, decoding envelopes and fanning out to
/// the owning user's sessions
///
/// Malformed payloads are logged and dropped; one bad publisher must not
/// stall the stream for everyone else.
async fn dispatch_loop(
    pattern: &'static str,
    mut rx: UnboundedReceiver<RawMessage>,
    registry: Arc<ConnectionRegistry>,
) {
    while let Some(raw) = rx.recv().await {
        let envelope = match Envelope::decode(&raw.payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                logger::warning(
                    LogTag::Router,
                    &format!("dropping malformed payload on {}: {}", raw.channel, e),
                );
                continue;
            }
        };

        if is_debug_router_enabled() {
            logger::debug(
                LogTag::Router,
                &format!(
                    "routing {} on {} to user {}",
                    envelope.kind.as_str(),
                    raw.channel,
                    envelope.user_id
                ),
            );
        }

        let user_id = envelope.user_id.clone();
        registry
            .broadcast_to_user(&user_id, ServerMessage::from_envelope(envelope))
            .await;
    }

    // The broker dropped this subscription; nothing downstream can recover it
    logger::error(
        LogTag::Router,
        &format!("subscription {} ended, telemetry stream is dark", pattern),
    );
}
