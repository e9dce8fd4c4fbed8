use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::sse::ServerEvent,
    error::ServiceError,
    services::{match_events, match_service},
    state::SharedState,
};

/// Subscribe to the public stream, returning the receiver and the `full-state`
/// event that must be delivered first.
pub async fn subscribe_public(
    state: &SharedState,
) -> Result<(broadcast::Receiver<ServerEvent>, Option<ServerEvent>), ServiceError> {
    // Subscribe before taking the snapshot so nothing between the two is lost.
    let receiver = state.hub().subscribe();
    let snapshot = match_service::current_match(state).await?;
    let initial = match match_events::full_state_event(&snapshot) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialize initial state");
            None
        }
    };
    Ok((receiver, initial))
}

/// Convert a broadcast receiver into an SSE response, forwarding events until
/// the client disconnects.
///
/// A lagging receiver skips the dropped events and gets a fresh `full-state`
/// instead.
pub fn to_sse_stream(
    state: SharedState,
    mut receiver: broadcast::Receiver<ServerEvent>,
    initial: Option<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(event) = initial.as_ref().and_then(to_sse_event) {
            if tx.send(Ok(event)).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    let payload = match recv_result {
                        Ok(payload) => payload,
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "public SSE stream lagged, resending full state");
                            let Ok(snapshot) = match_service::current_match(&state).await else {
                                break;
                            };
                            match match_events::full_state_event(&snapshot) {
                                Ok(event) => event,
                                Err(_) => continue,
                            }
                        }
                    };

                    let Some(event) = to_sse_event(&payload) else {
                        continue;
                    };
                    if tx.send(Ok(event)).await.is_err() {
                        break;
                    }
                }
            }
        }

        info!("public SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Map a hub event onto an SSE frame: the event name, then the JSON payload as data.
fn to_sse_event(payload: &ServerEvent) -> Option<Event> {
    match Event::default().event(&payload.event).json_data(&payload.data) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, event = %payload.event, "failed to encode SSE event");
            None
        }
    }
}
