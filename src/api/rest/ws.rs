use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

#[derive(Deserialize)]
pub struct TrackQuery {
    /// Restrict the stream to one agent; omit to receive every fix.
    pub agent_id: Option<Uuid>,
}

/// Live tracking feed: pushes each location fix as it is reported, as an
/// alternative to polling the location read endpoint.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<TrackQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.agent_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, agent_id: Option<Uuid>) {
    let (mut sender, mut receiver) = socket.split();
    let mut location_rx = state.location_events_tx.subscribe();

    info!("tracking client connected");

    let send_task = tokio::spawn(async move {
        while let Ok(location) = location_rx.recv().await {
            if agent_id.is_some_and(|id| id != location.delivery_agent_id) {
                continue;
            }

            let json = match serde_json::to_string(&location) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize location for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    // Closing the view tears down only this subscription; the agent keeps
    // reporting regardless.
    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!("tracking client disconnected");
}
