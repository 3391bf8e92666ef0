/// Event publisher
///
/// Wraps ingested telemetry in an Envelope and publishes it on the owning
/// user's channel. The HTTP ingestion surface that feeds this lives outside
/// the engine; the demo generator and tests drive it directly.
use std::sync::Arc;

use crate::arguments::is_debug_broker_enabled;
use crate::broker::{channels, Broker};
use crate::errors::BrokerError;
use crate::logger::{self, LogTag};
use crate::telemetry::{Envelope, EventKind, LogRecord};

pub struct EventPublisher {
    broker: Arc<dyn Broker>,
}

impl EventPublisher {
    pub fn new(broker: Arc<dyn Broker>) -> Self {
        Self { broker }
    }

    /// Publish a freshly ingested log for `user_id`
    pub async fn publish_log(&self, user_id: &str, record: &LogRecord) -> Result<(), BrokerError> {
        let data = serde_json::to_value(record)?;
        self.publish(EventKind::LogNew, user_id, data).await
    }

    /// Publish a freshly ingested trace summary for `user_id`
    pub async fn publish_trace(
        &self,
        user_id: &str,
        trace: serde_json::Value,
    ) -> Result<(), BrokerError> {
        self.publish(EventKind::TraceNew, user_id, trace).await
    }

    async fn publish(
        &self,
        kind: EventKind,
        user_id: &str,
        data: serde_json::Value,
    ) -> Result<(), BrokerError> {
        let envelope = Envelope::new(kind, user_id, data);
        let channel = match kind {
            EventKind::LogNew => channels::log_channel(user_id),
            EventKind::TraceNew => channels::trace_channel(user_id),
        };
        let payload = envelope.encode()?;

        self.broker.publish(&channel, payload).await?;

        if is_debug_broker_enabled() {
            logger::debug(
                LogTag::Publisher,
                &format!("published {} to '{}'", kind.as_str(), channel),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBroker;
    use chrono::Utc;

    #[tokio::test]
    async fn test_log_publish_lands_on_user_channel() {
        let broker = Arc::new(MemoryBroker::new());
        let mut rx = broker.pattern_subscribe("logs:*").await.unwrap();

        let publisher = EventPublisher::new(broker.clone());
        let record = LogRecord {
            timestamp: Utc::now(),
            level: "INFO".to_string(),
            message: "request served".to_string(),
            metadata: None,
        };
        publisher.publish_log("user-7", &record).await.unwrap();

        let raw = rx.recv().await.unwrap();
        assert_eq!(raw.channel, "logs:user-7");

        let envelope = Envelope::decode(&raw.payload).unwrap();
        assert_eq!(envelope.kind, EventKind::LogNew);
        assert_eq!(envelope.user_id, "user-7");
        assert_eq!(envelope.data["message"], "request served");
    }

    #[tokio::test]
    async fn test_trace_publish_lands_on_trace_channel() {
        let broker = Arc::new(MemoryBroker::new());
        let mut rx = broker.pattern_subscribe("traces:*").await.unwrap();

        let publisher = EventPublisher::new(broker.clone());
        publisher
            .publish_trace("user-7", serde_json::json!({"traceId": "t-1"}))
            .await
            .unwrap();

        let raw = rx.recv().await.unwrap();
        assert_eq!(raw.channel, "traces:user-7");
        let envelope = Envelope::decode(&raw.payload).unwrap();
        assert_eq!(envelope.kind, EventKind::TraceNew);
    }
}
