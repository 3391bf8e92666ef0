/// Connection Registry - user identity to live sessions
///
/// Concurrency-safe mapping from user id to the set of authenticated
/// sessions for that user. All mutation funnels through one RwLock;
/// gateway tasks register/unregister while the channel router broadcasts.
/// Fan-out is O(sessions-for-this-user): the map is keyed by user identity,
/// never scanned whole.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::arguments::is_debug_registry_enabled;
use crate::logger::{self, LogTag};

use super::message::ServerMessage;

/// Session ID (unique per WebSocket connection)
pub type SessionId = u64;

/// Per-session outbound queue
///
/// Unbounded: no backpressure is applied, a slow client's queue grows
/// without bound (documented limitation).
pub type SessionSender = mpsc::UnboundedSender<ServerMessage>;

/// An authenticated session's registry entry
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub user_id: String,
    pub email: String,
}

/// Registry over all live authenticated sessions
pub struct ConnectionRegistry {
    /// user_id -> (session_id -> outbound sender)
    sessions: RwLock<HashMap<String, HashMap<SessionId, SessionSender>>>,

    /// Next session ID
    next_session_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            next_session_id: AtomicU64::new(1),
        })
    }

    /// Allocate a session id for a new connection
    pub fn next_session_id(&self) -> SessionId {
        self.next_session_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Register an authenticated session
    ///
    /// The session becomes visible to every subsequent `broadcast_to_user`
    /// call for its user.
    pub async fn register(&self, session: &Session, sender: SessionSender) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session.user_id.clone())
            .or_default()
            .insert(session.id, sender);

        if is_debug_registry_enabled() {
            logger::debug(
                LogTag::Registry,
                &format!(
                    "session {} registered for user {} ({})",
                    session.id, session.user_id, session.email
                ),
            );
        }
    }

    /// Remove a session; idempotent
    ///
    /// Unregistering a session twice, or one that was never added, is a
    /// no-op.
    pub async fn unregister(&self, session: &Session) {
        self.remove(&session.user_id, session.id).await;
    }

    async fn remove(&self, user_id: &str, session_id: SessionId) {
        let mut sessions = self.sessions.write().await;
        if let Some(user_sessions) = sessions.get_mut(user_id) {
            if user_sessions.remove(&session_id).is_some() && is_debug_registry_enabled() {
                logger::debug(
                    LogTag::Registry,
                    &format!("session {} unregistered for user {}", session_id, user_id),
                );
            }
            if user_sessions.is_empty() {
                sessions.remove(user_id);
            }
        }
    }

    /// Deliver a message to every live session of one user
    ///
    /// One bad apple isolation: a failed send is logged and the offending
    /// session is unregistered, the remaining sessions still receive the
    /// message. Failures never surface to the caller. Sessions registered
    /// after the call began need not receive the message.
    pub async fn broadcast_to_user(&self, user_id: &str, message: ServerMessage) {
        let mut failed: Vec<SessionId> = Vec::new();

        {
            let sessions = self.sessions.read().await;
            let Some(user_sessions) = sessions.get(user_id) else {
                return;
            };

            for (session_id, sender) in user_sessions.iter() {
                if sender.send(message.clone()).is_err() {
                    // Receiver gone: session is closing
                    failed.push(*session_id);
                }
            }
        }

        for session_id in failed {
            logger::warning(
                LogTag::Registry,
                &format!(
                    "send to session {} of user {} failed, unregistering",
                    session_id, user_id
                ),
            );
            self.remove(user_id, session_id).await;
        }
    }

    /// Count of live sessions (diagnostic only)
    pub async fn stats(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .map(HashMap::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn test_message() -> ServerMessage {
        ServerMessage::LogNew {
            data: serde_json::json!({"message": "m"}),
            timestamp: chrono::Utc::now(),
        }
    }

    async fn add_session(
        registry: &ConnectionRegistry,
        user_id: &str,
    ) -> (Session, UnboundedReceiver<ServerMessage>) {
        let session = Session {
            id: registry.next_session_id(),
            user_id: user_id.to_string(),
            email: format!("{}@example.com", user_id),
        };
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(&session, tx).await;
        (session, rx)
    }

    #[tokio::test]
    async fn test_broadcast_targets_only_owning_user() {
        let registry = ConnectionRegistry::new();
        let (_s1, mut rx1) = add_session(&registry, "u1").await;
        let (_s2, mut rx2) = add_session(&registry, "u2").await;

        registry.broadcast_to_user("u1", test_message()).await;

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_all_sessions_of_user_receive() {
        let registry = ConnectionRegistry::new();
        let (_s1, mut rx1) = add_session(&registry, "u1").await;
        let (_s2, mut rx2) = add_session(&registry, "u1").await;

        registry.broadcast_to_user("u1", test_message()).await;

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_one_bad_apple_isolation() {
        let registry = ConnectionRegistry::new();
        let (_good, mut good_rx) = add_session(&registry, "u1").await;
        let (_bad, bad_rx) = add_session(&registry, "u1").await;

        // Dropping the receiver makes sends to this session fail
        drop(bad_rx);

        registry.broadcast_to_user("u1", test_message()).await;

        // The healthy session still received the message and the failed one
        // was removed
        assert!(good_rx.try_recv().is_ok());
        assert_eq!(registry.stats().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (s1, _rx1) = add_session(&registry, "u1").await;
        let (_s2, mut rx2) = add_session(&registry, "u1").await;

        registry.unregister(&s1).await;
        registry.unregister(&s1).await;

        // Unknown session is also a no-op
        let ghost = Session {
            id: 9999,
            user_id: "u1".to_string(),
            email: "ghost@example.com".to_string(),
        };
        registry.unregister(&ghost).await;

        assert_eq!(registry.stats().await, 1);
        registry.broadcast_to_user("u1", test_message()).await;
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_to_unknown_user_is_noop() {
        let registry = ConnectionRegistry::new();
        registry.broadcast_to_user("nobody", test_message()).await;
        assert_eq!(registry.stats().await, 0);
    }

    #[tokio::test]
    async fn test_stats_counts_all_users() {
        let registry = ConnectionRegistry::new();
        let (s1, _rx1) = add_session(&registry, "u1").await;
        let (_s2, _rx2) = add_session(&registry, "u1").await;
        let (_s3, _rx3) = add_session(&registry, "u2").await;

        assert_eq!(registry.stats().await, 3);
        registry.unregister(&s1).await;
        assert_eq!(registry.stats().await, 2);
    }
}
