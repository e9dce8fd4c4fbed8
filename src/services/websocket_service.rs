use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{broadcast::error::RecvError, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{sse::ServerEvent, ws::ClientAction},
    error::ServiceError,
    services::{match_events, match_service},
    state::SharedState,
};

/// The writer channel is closed; the connection should be torn down.
#[derive(Debug, Error)]
#[error("connection closed")]
struct ConnectionClosed;

/// Handle the full lifecycle of one WebSocket client.
///
/// Every client is both an observer (it receives every broadcast) and a
/// potential actor (its text frames are parsed as [`ClientAction`]s).
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let connection = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    // Subscribe before taking the snapshot so nothing between the two is lost.
    let events = state.hub().subscribe();
    match match_service::current_match(&state).await {
        Ok(snapshot) => match match_events::full_state_event(&snapshot) {
            Ok(event) => {
                if send_event(&outbound_tx, &event).is_err() {
                    finalize(writer_task, outbound_tx).await;
                    return;
                }
            }
            Err(err) => warn!(%connection, error = %err, "failed to serialize initial state"),
        },
        Err(err) => {
            warn!(%connection, error = %err, "cannot read match state, closing socket");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    }

    info!(%connection, "websocket client connected");
    let forwarder = spawn_forwarder(state.clone(), connection, events, outbound_tx.clone());

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let Some(reply) = handle_text_frame(&state, connection, &text).await else {
                    continue;
                };
                if send_event(&outbound_tx, &reply).is_err() {
                    break;
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {
                debug!(%connection, "ignoring binary frame");
            }
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%connection, error = %err, "websocket error");
                break;
            }
        }
    }

    forwarder.abort();
    info!(%connection, "websocket client disconnected");
    finalize(writer_task, outbound_tx).await;
}

/// Parse and apply one text frame, returning the event addressed to the sender
/// alone, if any.
///
/// Broadcast events produced by the action reach the sender through the hub
/// like every other observer; only rejections are answered here.
async fn handle_text_frame(
    state: &SharedState,
    connection: Uuid,
    text: &str,
) -> Option<ServerEvent> {
    debug!(%connection, payload = %text, "received client frame");
    let action = match ClientAction::from_json_str(text) {
        Ok(action) => action,
        Err(err) => {
            warn!(%connection, error = %err, "failed to parse client action");
            return None;
        }
    };

    let name = action.name();
    match match_service::apply_client_action(state, action).await {
        Ok(_) => None,
        Err(ServiceError::InvalidInput(message)) => {
            info!(%connection, action = name, %message, "client action rejected");
            match match_events::validation_error_event(&message) {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!(error = %err, "failed to serialize validation error");
                    None
                }
            }
        }
        Err(err) => {
            warn!(%connection, action = name, error = %err, "client action failed");
            None
        }
    }
}

/// Relay hub broadcasts to this client, resynchronizing it with a full state
/// whenever its receiver fell behind.
fn spawn_forwarder(
    state: SharedState,
    connection: Uuid,
    mut events: tokio::sync::broadcast::Receiver<ServerEvent>,
    outbound_tx: mpsc::UnboundedSender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%connection, skipped, "websocket client lagged, resending full state");
                    let Ok(snapshot) = match_service::current_match(&state).await else {
                        break;
                    };
                    match match_events::full_state_event(&snapshot) {
                        Ok(event) => event,
                        Err(err) => {
                            warn!(error = %err, "failed to serialize full state");
                            continue;
                        }
                    }
                }
            };

            if send_event(&outbound_tx, &event).is_err() {
                break;
            }
        }
    })
}

/// Serialize an event as `{"event", "data"}` and queue it on the writer.
///
/// Serialization failures are logged and swallowed; an error is returned only
/// when the writer channel is closed.
fn send_event(
    tx: &mpsc::UnboundedSender<Message>,
    event: &ServerEvent,
) -> Result<(), ConnectionClosed> {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, event = %event.event, "failed to serialize websocket event");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        services::match_events::{FULL_STATE, VALIDATION_ERROR},
        state::AppState,
    };

    fn create_frame(rows: usize) -> String {
        let wheel: Vec<_> = (0..rows)
            .map(|index| json!({ "word": format!("palabra{index}"), "definition": "pista" }))
            .collect();
        json!({ "action": "create-match", "wheel1": wheel, "wheel2": wheel }).to_string()
    }

    #[tokio::test(start_paused = true)]
    async fn short_wheel_is_answered_to_the_sender_only() {
        let state = AppState::new(AppConfig::default());
        let mut observers = state.hub().subscribe();

        let reply = handle_text_frame(&state, Uuid::new_v4(), &create_frame(5))
            .await
            .expect("sender gets a rejection");

        assert_eq!(reply.event, VALIDATION_ERROR);
        assert!(!reply.data["message"].as_str().unwrap().is_empty());
        assert!(observers.try_recv().is_err());
        assert!(!match_service::current_match(&state).await.unwrap().is_active);
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_action_is_only_broadcast() {
        let state = AppState::new(AppConfig::default());
        let mut observers = state.hub().subscribe();

        let reply = handle_text_frame(&state, Uuid::new_v4(), &create_frame(27)).await;

        assert!(reply.is_none());
        assert_eq!(observers.try_recv().unwrap().event, FULL_STATE);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_and_ignored_frames_get_no_reply() {
        let state = AppState::new(AppConfig::default());
        let mut observers = state.hub().subscribe();

        assert!(handle_text_frame(&state, Uuid::new_v4(), "{oops").await.is_none());
        let pass = r#"{"action":"submit-pass","team":1}"#;
        assert!(handle_text_frame(&state, Uuid::new_v4(), pass).await.is_none());
        assert!(observers.try_recv().is_err());
    }
}
