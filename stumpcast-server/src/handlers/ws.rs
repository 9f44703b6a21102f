use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use stumpcast_core::Submission;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::infra::{app_state::AppState, websocket::Connection};

/// Sentinel the browser client sends to request its backlog.
const HISTORY_REQUEST: &str = "GET_INITIAL_COMMENTS";

/// Outbound lines buffered per connection before backpressure applies.
const OUTBOUND_BUFFER: usize = 256;

/// Handle WebSocket upgrade request
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);

    let connection = Arc::new(Connection::new(tx));
    let conn_id = connection.id;

    state.registry.add(Arc::clone(&connection));

    // Writer task: drains the connection channel onto the socket. When the
    // socket dies the receiver goes away and pending sends fail, which is
    // how the broadcaster learns to evict.
    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if ws_sender.send(Message::Text(line.into())).await.is_err() {
                break;
            }
        }
    });

    // A new connection starts at cursor 0 and catches up through the same
    // delivery path every broadcast uses.
    spawn_catch_up(&state, &connection);

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_client_message(text.as_str(), &state, &connection).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(connection = %conn_id, error = %err, "websocket error");
                break;
            }
        }
    }

    // Clean up on disconnect; the registry also forgets the cursor.
    state.registry.remove(conn_id);
}

fn spawn_catch_up(state: &AppState, connection: &Arc<Connection>) {
    let broadcaster = state.broadcaster.clone();
    let connection = Arc::clone(connection);
    tokio::spawn(async move {
        broadcaster.deliver_pending(&connection).await;
    });
}

async fn handle_client_message(text: &str, state: &AppState, connection: &Arc<Connection>) {
    if text == HISTORY_REQUEST {
        spawn_catch_up(state, connection);
        return;
    }

    let submission: Submission = match serde_json::from_str(text) {
        Ok(submission) => submission,
        Err(err) => {
            warn!(connection = %connection.id, error = %err, "discarding malformed submission");
            return;
        }
    };

    if let Err(err) = submission.validate() {
        // Rejected before any state mutation; the connection stays open.
        warn!(connection = %connection.id, error = %err, "rejecting submission");
        return;
    }

    let item = match state
        .store
        .record(&submission.commentary, submission.delta())
        .await
    {
        Ok(item) => item,
        Err(err) => {
            // Not accepted: no score change, no broadcast.
            error!(connection = %connection.id, error = %err, "failed to record submission");
            return;
        }
    };

    // Mirror downstream without ever blocking or failing the submit path.
    let publisher = Arc::clone(&state.publisher);
    let stream_key = state.config.commentary_stream_key.clone();
    let mirrored = item.text.clone();
    tokio::spawn(async move {
        if let Err(err) = publisher.publish(&stream_key, &mirrored).await {
            warn!(error = %err, "downstream publish failed");
        }
    });

    state.broadcaster.fan_out();
}
