//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection: decodes
//! command envelopes, dispatches them to an [`RpcSession`], and writes the
//! reply. Notifications are never pushed; clients drain them with the
//! endpoint's poll command.

use std::future::Future;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::time::{self, Instant};

use super::messages::{WsMessage, WsMessageType};
use crate::error::GatewayError;

/// Interval between keepalive pings on an idle socket.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// One endpoint's command handling, bound to a single connection.
pub trait RpcSession: Send + 'static {
    /// Command set accepted by this endpoint.
    type Command: DeserializeOwned + Send;

    /// Endpoint name used in logs and the greeting event.
    const ENDPOINT: &'static str;

    /// Executes one command, returning the reply payload.
    fn handle(
        &mut self,
        command: Self::Command,
    ) -> impl Future<Output = Result<serde_json::Value, GatewayError>> + Send;

    /// Releases whatever the session holds. Runs once the socket closes.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Sends a `connected` event, then answers each command frame in order.
/// - Pings the client every 30 seconds.
/// - Calls [`RpcSession::close`] when the socket closes or errors.
pub async fn run_connection<S: RpcSession>(socket: WebSocket, mut session: S) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut ping = time::interval_at(Instant::now() + PING_INTERVAL, PING_INTERVAL);
    tracing::debug!(endpoint = S::ENDPOINT, "ws connection opened");

    let greeting = WsMessage {
        id: uuid::Uuid::new_v4().to_string(),
        msg_type: WsMessageType::Event,
        timestamp: chrono::Utc::now(),
        payload: serde_json::json!({ "event": "connected", "endpoint": S::ENDPOINT }),
    };
    if ws_tx.send(Message::text(greeting.to_json())).await.is_ok() {
        loop {
            tokio::select! {
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let reply = handle_text_message(text.as_str(), &mut session).await;
                            if ws_tx.send(Message::text(reply.to_json())).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            tracing::debug!(endpoint = S::ENDPOINT, error = %e, "ws read failed");
                            break;
                        }
                        _ => {}
                    }
                }
                _ = ping.tick() => {
                    if ws_tx.send(Message::Ping(Default::default())).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    session.close().await;
    tracing::debug!(endpoint = S::ENDPOINT, "ws connection closed");
}

/// Decodes one text frame and dispatches it, always producing a reply.
pub async fn handle_text_message<S: RpcSession>(text: &str, session: &mut S) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(
            "",
            &GatewayError::InvalidRequest("malformed JSON".to_string()),
        );
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(
            msg.id,
            &GatewayError::InvalidRequest("expected a command envelope".to_string()),
        );
    }

    let command = match serde_json::from_value::<S::Command>(msg.payload) {
        Ok(command) => command,
        Err(e) => {
            return WsMessage::error(
                msg.id,
                &GatewayError::InvalidRequest(format!("unknown or malformed command: {e}")),
            );
        }
    };

    match session.handle(command).await {
        Ok(payload) => WsMessage::response(msg.id, payload),
        Err(err) => {
            tracing::debug!(endpoint = S::ENDPOINT, code = err.error_code(), %err, "command rejected");
            WsMessage::error(msg.id, &err)
        }
    }
}

/// Serializes a reply payload.
///
/// # Errors
///
/// Returns [`GatewayError::Internal`] if serialization fails.
pub fn to_payload<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::Internal(e.to_string()))
}
