use roomcast_domain::{RoomCode, RoomError};
use serde_json::Value;

use super::*;

const GAME_ROOM_MISSING: &str = "The game room does not exist.";

pub(super) async fn handle_start_game(
    state: &WsState,
    connection_id: ConnectionId,
    room_code: String,
) -> Option<ServerMessage> {
    // An empty code can never name a live room
    let result = match RoomCode::new(room_code) {
        Ok(code) => state
            .rooms
            .start_game(&code, connection_id)
            .await
            .map(|game_id| (code, game_id)),
        Err(_) => Err(RoomError::RoomNotFound),
    };

    match result {
        Ok((code, game_id)) => {
            state
                .connections
                .broadcast_to_room(
                    &code,
                    ServerMessage::GameStarting {
                        game_id: game_id.to_string(),
                    },
                    None,
                )
                .await;
            None
        }
        Err(e) => {
            tracing::info!(
                connection_id = %connection_id,
                reason = e.kind(),
                "startGame rejected"
            );
            Some(ServerMessage::StartGameError {
                message: e.to_string(),
            })
        }
    }
}

/// Attach a connection to a live room's channel without touching membership.
pub(super) async fn handle_join_board_game_room(
    state: &WsState,
    connection_id: ConnectionId,
    room_code: String,
) -> Option<ServerMessage> {
    let code = match RoomCode::new(room_code) {
        Ok(code) => code,
        Err(_) => {
            return Some(ServerMessage::ErrorJoiningGameRoom {
                message: GAME_ROOM_MISSING.to_string(),
            })
        }
    };
    let creator = match state.rooms.creator_of(&code).await {
        Some(creator) => creator,
        None => {
            tracing::warn!(
                connection_id = %connection_id,
                room_code = %code,
                "Attempt to join missing game room"
            );
            return Some(ServerMessage::ErrorJoiningGameRoom {
                message: GAME_ROOM_MISSING.to_string(),
            });
        }
    };

    if let Err(e) = state.connections.subscribe(connection_id, &code, creator).await {
        tracing::warn!(connection_id = %connection_id, error = %e, "Game room attach failed");
    }
    None
}

/// Record and relay a game state to everyone else in the room.
///
/// Fire-and-forget: nothing is sent back, and a missing room drops the
/// update silently. Updates are not sequenced, so concurrent senders race
/// and the last one recorded wins.
pub(super) async fn handle_broadcast_game_state(
    state: &WsState,
    connection_id: ConnectionId,
    room_code: String,
    game_state: Value,
) -> Option<ServerMessage> {
    let Ok(code) = RoomCode::new(room_code) else {
        return None;
    };

    if let Err(e) = state
        .rooms
        .record_game_state(&code, game_state.clone())
        .await
    {
        tracing::debug!(
            connection_id = %connection_id,
            room_code = %code,
            reason = e.kind(),
            "Dropped game state relay"
        );
        return None;
    }

    tracing::debug!(connection_id = %connection_id, room_code = %code, "Relaying game state");
    state
        .connections
        .broadcast_to_room(
            &code,
            ServerMessage::GameStateUpdated { game_state },
            Some(connection_id),
        )
        .await;
    None
}
