//! WebSocket change feed.
//!
//! DESIGN
//! ======
//! The store subscription is opened before the upgrade is accepted, so a
//! client whose handshake completed never misses an event produced after
//! it. The connection then runs a `select!` loop:
//! - Store events → JSON text message to the client
//! - Client messages → ignored, except close
//!
//! If the feed cannot be opened the upgrade is refused with `503`.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};

use crate::state::AppState;
use crate::store::{StoreEvent, Subscription};

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let subscription = match state.store.subscribe().await {
        Ok(subscription) => subscription,
        Err(e) => {
            error!(error = %e, "ws: change feed unavailable");
            return (StatusCode::SERVICE_UNAVAILABLE, "change feed unavailable").into_response();
        }
    };

    ws.on_upgrade(move |socket| run_ws(socket, subscription))
}

async fn run_ws(mut socket: WebSocket, mut subscription: Subscription) {
    info!("ws: feed client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            event = subscription.recv() => {
                let Some(event) = event else {
                    warn!("ws: store feed ended");
                    break;
                };
                let text = match encode_event(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "ws: failed to encode store event");
                        continue;
                    }
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    info!("ws: feed client disconnected");
}

fn encode_event(event: &StoreEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}
