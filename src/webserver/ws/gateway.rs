/// WebSocket gateway - upgrade endpoint and authentication handshake
///
/// Every connection walks an explicit state machine:
///
/// ```text
/// Connecting --token present--> Authenticating --validated--> Authenticated
///     |                              |                            |
///     +--no token--> Closed <--validation failed/timed out--------+
///                                                       (disconnect/send failure)
/// ```
///
/// A session is present in the registry if and only if it is Authenticated.
/// The validator call is the only suspend point of the handshake and runs
/// under a bounded window; a late validator result for a closed connection
/// is discarded with the future.
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::arguments::is_debug_gateway_enabled;
use crate::auth::{TokenClaims, TokenValidator};
use crate::errors::AuthError;
use crate::logger::{self, LogTag};
use crate::webserver::state::AppState;

use super::liveness::{LivenessAction, LivenessConfig, LivenessTracker};
use super::message::{ClientMessage, ServerMessage};
use super::registry::Session;

/// Handshake state of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Connecting,
    Authenticating,
    Authenticated,
    Closed,
}

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub token: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws/logs", get(ws_upgrade_handler))
}

/// Upgrade handler: token material is captured from the request before the
/// protocol switch, the handshake itself runs on the socket task
pub async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let token = extract_token(query.token, &headers);
    ws.on_upgrade(move |socket| handle_socket(socket, token, state))
}

/// Token from the `token` query parameter or a bearer authorization header
///
/// Empty strings count as absent.
pub(crate) fn extract_token(query_token: Option<String>, headers: &HeaderMap) -> Option<String> {
    if let Some(token) = query_token.filter(|t| !t.is_empty()) {
        return Some(token);
    }
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Run the bounded authentication handshake
///
/// `Connecting -> Authenticating -> Authenticated` on success; every error
/// maps to a close with a distinguishing reason. The window bounds the
/// validator call so a hung validator cannot leak connections.
pub(crate) async fn authenticate(
    token: Option<&str>,
    validator: &dyn TokenValidator,
    window: Duration,
) -> Result<TokenClaims, AuthError> {
    let Some(token) = token else {
        return Err(AuthError::Required);
    };

    // Connecting -> Authenticating
    match tokio::time::timeout(window, validator.validate(token)).await {
        Ok(result) => result,
        // Window elapsed: the in-flight validation is abandoned with the
        // dropped future and its result, if any, never observed
        Err(_) => Err(AuthError::TimedOut),
    }
}

async fn handle_socket(socket: WebSocket, token: Option<String>, state: Arc<AppState>) {
    let mut handshake = HandshakeState::Connecting;
    let (mut ws_tx, mut ws_rx) = socket.split();

    if is_debug_gateway_enabled() {
        logger::debug(
            LogTag::Gateway,
            &format!(
                "connection accepted (token={})",
                if token.is_some() { "present" } else { "missing" }
            ),
        );
    }

    if token.is_some() {
        handshake = HandshakeState::Authenticating;
    }

    let window = Duration::from_secs(state.config.websocket.auth_timeout_secs);
    let claims = match authenticate(token.as_deref(), state.validator.as_ref(), window).await {
        Ok(claims) => claims,
        Err(err) => {
            logger::warning(
                LogTag::Gateway,
                &format!("handshake rejected in {:?} state: {}", handshake, err),
            );
            reject(&mut ws_tx, err).await;
            return;
        }
    };

    handshake = HandshakeState::Authenticated;
    logger::info(
        LogTag::Gateway,
        &format!(
            "session authenticated for {} ({}) [{:?}]",
            claims.email, claims.user_id, handshake
        ),
    );

    let session = Session {
        id: state.registry.next_session_id(),
        user_id: claims.user_id,
        email: claims.email,
    };
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.registry.register(&session, tx).await;

    // Acknowledge the handshake; identity is never echoed back
    let hello = [
        ServerMessage::AuthSuccess {
            message: "Authenticated successfully".to_string(),
        },
        ServerMessage::ConnectionStatus {
            message: "Connected to real-time telemetry stream".to_string(),
            timestamp: chrono::Utc::now(),
        },
    ];
    for msg in hello {
        if send_frame(&mut ws_tx, &msg).await.is_err() {
            state.registry.unregister(&session).await;
            return;
        }
    }

    let mut liveness = LivenessTracker::new(LivenessConfig::new(
        state.config.websocket.heartbeat_secs,
        state.config.websocket.idle_timeout_secs,
    ));

    // Main session loop: outbound queue drain, client control frames,
    // liveness ticks
    loop {
        tokio::select! {
            biased;

            outbound = rx.recv() => {
                match outbound {
                    Some(msg) => {
                        if let Err(e) = send_frame(&mut ws_tx, &msg).await {
                            logger::warning(
                                LogTag::Gateway,
                                &format!("session {}: send failed: {}", session.id, e),
                            );
                            break;
                        }
                    }
                    // Registry dropped the sender (session was unregistered
                    // by a failed broadcast)
                    None => break,
                }
            }

            inbound = ws_rx.next() => {
                if !handle_inbound(inbound, &session, &mut ws_tx, &mut liveness).await {
                    break;
                }
            }

            _ = tokio::time::sleep(Duration::from_secs(1)) => {
                match liveness.check() {
                    LivenessAction::Healthy => {}
                    LivenessAction::SendPing => {
                        if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                            break;
                        }
                        liveness.record_ping();
                    }
                    LivenessAction::Close => {
                        logger::warning(
                            LogTag::Gateway,
                            &format!("session {}: liveness timeout", session.id),
                        );
                        break;
                    }
                }
            }
        }
    }

    // Synchronous removal: no broadcast after this point targets the
    // stale handle
    state.registry.unregister(&session).await;
    handshake = HandshakeState::Closed;

    if is_debug_gateway_enabled() {
        logger::debug(
            LogTag::Gateway,
            &format!("session {} closed ({:?})", session.id, handshake),
        );
    }
}

/// Handle one inbound socket event; false ends the session
async fn handle_inbound(
    inbound: Option<Result<Message, axum::Error>>,
    session: &Session,
    ws_tx: &mut SplitSink<WebSocket, Message>,
    liveness: &mut LivenessTracker,
) -> bool {
    match inbound {
        Some(Ok(Message::Text(text))) => {
            liveness.record_activity();
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Ping) => {
                    let pong = ServerMessage::Pong {
                        timestamp: chrono::Utc::now(),
                    };
                    if send_frame(ws_tx, &pong).await.is_err() {
                        return false;
                    }
                }
                Ok(ClientMessage::Subscribe { .. }) => {
                    let ack = ServerMessage::SubscribeSuccess {
                        message: "Subscribed to telemetry stream".to_string(),
                    };
                    if send_frame(ws_tx, &ack).await.is_err() {
                        return false;
                    }
                }
                Err(_) => {
                    if is_debug_gateway_enabled() {
                        logger::debug(
                            LogTag::Gateway,
                            &format!("session {}: unknown client frame ignored", session.id),
                        );
                    }
                }
            }
            true
        }
        Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
            liveness.record_activity();
            true
        }
        Some(Ok(Message::Close(_))) | None => false,
        Some(Err(e)) => {
            logger::warning(
                LogTag::Gateway,
                &format!("session {}: socket error: {}", session.id, e),
            );
            false
        }
        _ => true,
    }
}

/// Send the error frame and 1008 close for a failed handshake
async fn reject(ws_tx: &mut SplitSink<WebSocket, Message>, err: AuthError) {
    let frame = ServerMessage::Error {
        error: err.close_reason().to_string(),
        message: err.to_string(),
    };
    // The connection is going away either way; close delivery is best effort
    let _ = send_frame(ws_tx, &frame).await;
    let _ = ws_tx
        .send(Message::Close(Some(CloseFrame {
            code: close_code::POLICY,
            reason: err.close_reason().into(),
        })))
        .await;
}

async fn send_frame(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    match msg.to_json() {
        Ok(json) => ws_tx.send(Message::Text(json)).await,
        Err(e) => {
            logger::error(
                LogTag::Gateway,
                &format!("failed to serialize outbound frame: {}", e),
            );
            // A frame that cannot serialize is dropped, not fatal
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct AcceptingValidator;

    #[async_trait]
    impl TokenValidator for AcceptingValidator {
        async fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
            Ok(TokenClaims {
                user_id: format!("user-of-{}", token),
                email: "dev@example.com".to_string(),
            })
        }
    }

    struct RejectingValidator;

    #[async_trait]
    impl TokenValidator for RejectingValidator {
        async fn validate(&self, _token: &str) -> Result<TokenClaims, AuthError> {
            Err(AuthError::Failed)
        }
    }

    /// Never resolves; models an upstream validator hang
    struct HangingValidator;

    #[async_trait]
    impl TokenValidator for HangingValidator {
        async fn validate(&self, _token: &str) -> Result<TokenClaims, AuthError> {
            std::future::pending().await
        }
    }

    fn window() -> Duration {
        Duration::from_millis(50)
    }

    #[tokio::test]
    async fn test_missing_token_is_auth_required() {
        let result = authenticate(None, &AcceptingValidator, window()).await;
        assert_eq!(result.unwrap_err(), AuthError::Required);
    }

    #[tokio::test]
    async fn test_valid_token_authenticates() {
        let claims = authenticate(Some("tok"), &AcceptingValidator, window())
            .await
            .unwrap();
        assert_eq!(claims.user_id, "user-of-tok");
    }

    #[tokio::test]
    async fn test_rejected_token_is_auth_failed() {
        let result = authenticate(Some("tok"), &RejectingValidator, window()).await;
        assert_eq!(result.unwrap_err(), AuthError::Failed);
    }

    #[tokio::test]
    async fn test_hung_validator_is_bounded_by_window() {
        let started = std::time::Instant::now();
        let result = authenticate(Some("tok"), &HangingValidator, window()).await;
        assert_eq!(result.unwrap_err(), AuthError::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_close_reasons_distinguish_failures() {
        assert_eq!(AuthError::Required.close_reason(), "Authentication required");
        assert_eq!(AuthError::Failed.close_reason(), "Authentication failed");
    }

    #[test]
    fn test_token_extraction() {
        let empty = HeaderMap::new();
        assert_eq!(
            extract_token(Some("abc".to_string()), &empty).as_deref(),
            Some("abc")
        );
        assert_eq!(extract_token(Some(String::new()), &empty), None);
        assert_eq!(extract_token(None, &empty), None);

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer header-token".parse().unwrap(),
        );
        assert_eq!(
            extract_token(None, &headers).as_deref(),
            Some("header-token")
        );

        // Query parameter wins over the header
        assert_eq!(
            extract_token(Some("query-token".to_string()), &headers).as_deref(),
            Some("query-token")
        );

        // Raw header value without the Bearer prefix is accepted as-is
        let mut raw = HeaderMap::new();
        raw.insert(axum::http::header::AUTHORIZATION, "raw-token".parse().unwrap());
        assert_eq!(extract_token(None, &raw).as_deref(), Some("raw-token"));
    }
}
