/// Wire envelope carried on broker channels
///
/// Every ingested log or trace is wrapped in one Envelope and published on
/// its per-user channel. The Channel Router derives the owning user from the
/// envelope body only, never from the channel name.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Telemetry event kind, the envelope discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "log:new")]
    LogNew,
    #[serde(rename = "trace:new")]
    TraceNew,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::LogNew => "log:new",
            EventKind::TraceNew => "trace:new",
        }
    }
}

/// Envelope published on `logs:{userId}` / `traces:{userId}` channels
///
/// Immutable once constructed by the publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub data: serde_json::Value,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    pub fn new(kind: EventKind, user_id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind,
            data,
            user_id: user_id.into(),
            timestamp: Utc::now(),
        }
    }

    /// Decode a raw broker payload
    pub fn decode(payload: &str) -> Result<Envelope, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Serialize to the wire payload
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Log record payload carried in `log:new` envelopes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}
