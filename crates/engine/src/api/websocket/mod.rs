//! WebSocket handling for lobby connections.
//!
//! Bridges the WebSocket protocol to the room registry: each inbound
//! `ClientMessage` becomes one registry operation, and each outcome becomes
//! a direct reply and/or a room-wide broadcast through the connection
//! manager. Room data itself lives only in the registry.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

mod ws_game;
mod ws_room;

use roomcast_domain::{ConnectionId, Member};
use roomcast_shared::{ClientMessage, RoomMemberData, ServerMessage};

use super::connections::{ConnectionManager, Handshake};
use crate::stores::RoomRegistry;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub rooms: Arc<RoomRegistry>,
    pub connections: Arc<ConnectionManager>,
}

/// Query parameters a client may attach to the upgrade request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeParams {
    #[serde(default)]
    pub db_user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

impl From<HandshakeParams> for Handshake {
    fn from(params: HandshakeParams) -> Self {
        Self {
            db_user_id: params.db_user_id,
            user_name: params.user_name,
        }
    }
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HandshakeParams>,
    State(state): State<Arc<WsState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params.into()))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>, handshake: Handshake) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = ConnectionId::new();

    // Create a bounded channel for sending messages to this client
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    tracing::info!(
        connection_id = %connection_id,
        db_user_id = ?handshake.db_user_id,
        user_name = ?handshake.user_name,
        "WebSocket connection established"
    );

    state
        .connections
        .register(connection_id, handshake, tx.clone())
        .await;

    // Spawn a task to forward messages from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize server message");
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match ClientMessage::decode(text.as_str()) {
                Ok(msg) => {
                    if let Some(response) = handle_message(msg, &state, connection_id).await {
                        if tx.try_send(response).is_err() {
                            tracing::warn!(
                                connection_id = %connection_id,
                                "Failed to send response, channel full or closed"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
                    let error = ServerMessage::Error {
                        code: "PARSE_ERROR".to_string(),
                        message: format!("Invalid message format: {}", e),
                    };
                    if tx.try_send(error).is_err() {
                        tracing::warn!(
                            connection_id = %connection_id,
                            "Failed to send parse error, channel full or closed"
                        );
                    }
                }
            },
            Ok(Message::Ping(_)) => {
                if tx.try_send(ServerMessage::Pong).is_err() {
                    tracing::warn!(
                        connection_id = %connection_id,
                        "Failed to send pong, channel full or closed"
                    );
                }
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    // Clean up: detach from the transport first so room notices about this
    // departure never target the closed socket.
    state.connections.unregister(connection_id).await;
    ws_room::handle_disconnect(&state, connection_id).await;
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Dispatch a parsed client message to the appropriate handler.
///
/// Returns the direct reply for the sender, if any. Broadcasts are issued
/// by the handlers themselves.
async fn handle_message(
    msg: ClientMessage,
    state: &WsState,
    connection_id: ConnectionId,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Heartbeat => Some(ServerMessage::Pong),

        // Room lifecycle
        ClientMessage::CreateRoom { room_code, user } => {
            ws_room::handle_create_room(state, connection_id, room_code, user).await
        }
        ClientMessage::JoinRoom { room_code, user } => {
            ws_room::handle_join_room(state, connection_id, room_code, user).await
        }

        // Game
        ClientMessage::StartGame { room_code } => {
            ws_game::handle_start_game(state, connection_id, room_code).await
        }
        ClientMessage::JoinBoardGameRoom { room_code } => {
            ws_game::handle_join_board_game_room(state, connection_id, room_code).await
        }
        ClientMessage::BroadcastGameState {
            room_code,
            game_state,
        } => ws_game::handle_broadcast_game_state(state, connection_id, room_code, game_state).await,
    }
}

/// Convert members to their wire form, keeping join order.
fn members_to_wire(members: &[Member]) -> Vec<RoomMemberData> {
    members
        .iter()
        .map(|m| RoomMemberData {
            socket_id: m.connection_id().to_string(),
            db_user_id: m.identity().value(),
            user_name: m.display_name().to_string(),
        })
        .collect()
}
