use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Public websocket endpoint: server-to-client event push only.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut events = state.events.subscribe();
    let (mut sender, mut receiver) = socket.split();
    debug!("websocket client connected");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(p) => p,
                        Err(e) => {
                            warn!(error = %e, "failed to serialize event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                // Slow clients skip missed events; there is no replay.
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // No client-to-server messages are defined.
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("websocket client disconnected");
}
