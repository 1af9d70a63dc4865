//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ConnectionCommand, ConnectionId},
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives encoded events from the rx channel and writes them to the WebSocket.
///
/// # Arguments
///
/// * `rx` - Channel receiver fed by the MessagePusher
/// * `sender` - WebSocket sink of this connection
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // `connected` is queued on the channel before the pusher loop starts
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state.connect_session_usecase.execute(tx).await;

    let state_clone = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    // Awaited in place so that events of one connection are handled in order
                    handle_text(&state_clone, connection_id, &text).await;
                }
                Message::Close(_) => {
                    tracing::debug!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    let send_task = pusher_loop(rx, sender);
    wait_for_session_end(recv_task, send_task).await;

    state
        .disconnect_session_usecase
        .execute(&connection_id)
        .await;
}

/// Waits until either task completes, then aborts the other and waits for it to stop.
///
/// The disconnect cleanup runs after this returns, so a frame still being handled
/// cannot re-register the connection behind it.
async fn wait_for_session_end(mut recv_task: JoinHandle<()>, mut send_task: JoinHandle<()>) {
    tokio::select! {
        _ = &mut recv_task => {
            send_task.abort();
            let _ = send_task.await;
        }
        _ = &mut send_task => {
            recv_task.abort();
            let _ = recv_task.await;
        }
    };
}

/// Decodes one text frame and hands it to the use case. Bad frames are dropped.
async fn handle_text(state: &AppState, connection_id: ConnectionId, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(
                "Dropped unparseable frame from '{}': {}",
                connection_id,
                e
            );
            return;
        }
    };

    let command = match ConnectionCommand::try_from(message) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("Dropped frame from '{}': {}", connection_id, e);
            return;
        }
    };

    tracing::debug!("Received {:?} from '{}'", command, connection_id);

    // The store reconciliation keeps running detached
    let _reconciliation = state
        .handle_client_event_usecase
        .execute(connection_id, command)
        .await;
}
