/// WebSocket message schema
///
/// Server frames are a tagged enum; the `type` field is the discriminant.
/// The owning user id is never part of a server frame: identity is implicit
/// in which socket receives it.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::telemetry::{Envelope, EventKind};

/// Frames sent to the client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "log:new")]
    LogNew {
        data: serde_json::Value,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "trace:new")]
    TraceNew {
        data: serde_json::Value,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "auth:success")]
    AuthSuccess { message: String },

    #[serde(rename = "connection:status")]
    ConnectionStatus {
        message: String,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "subscribe:success")]
    SubscribeSuccess { message: String },

    #[serde(rename = "pong")]
    Pong { timestamp: DateTime<Utc> },

    #[serde(rename = "error")]
    Error { error: String, message: String },
}

impl ServerMessage {
    /// Derive the outbound frame for an inbound envelope
    ///
    /// The envelope's user id is intentionally dropped here; it only steers
    /// registry routing.
    pub fn from_envelope(envelope: Envelope) -> ServerMessage {
        match envelope.kind {
            EventKind::LogNew => ServerMessage::LogNew {
                data: envelope.data,
                timestamp: envelope.timestamp,
            },
            EventKind::TraceNew => ServerMessage::TraceNew {
                data: envelope.data,
                timestamp: envelope.timestamp,
            },
        }
    }

    /// Serialize to JSON text
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Frames received from the client after authentication
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Keepalive; answered with a pong frame
    Ping,

    /// Stream subscription acknowledgment (the log stream is implicit; the
    /// field is accepted for forward compatibility)
    Subscribe {
        #[serde(default)]
        channel: Option<String>,
    },
}
