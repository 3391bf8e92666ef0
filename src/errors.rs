/// Error taxonomy for the telemetry distribution engine
///
/// Recovery semantics live at the use sites:
/// - Auth errors close the offending connection; never retried server-side
/// - Malformed envelopes are logged and dropped; the subscription continues
/// - Subscription failures are fatal and propagate to startup
/// - Send failures unregister the offending session only
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication required: no token provided")]
    Required,

    #[error("invalid or expired token")]
    Failed,

    #[error("token validation timed out")]
    TimedOut,
}

impl AuthError {
    /// Human-readable close reason sent with the 1008 close frame
    pub fn close_reason(&self) -> &'static str {
        match self {
            AuthError::Required => "Authentication required",
            AuthError::Failed => "Authentication failed",
            AuthError::TimedOut => "Authentication timed out",
        }
    }
}

#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("pattern subscription '{pattern}' failed: {reason}")]
    Subscribe { pattern: String, reason: String },

    #[error("publish to '{channel}' failed: {reason}")]
    Publish { channel: String, reason: String },

    #[error("envelope encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("broker subscription failure: {0}")]
    Subscription(#[from] BrokerError),
}
