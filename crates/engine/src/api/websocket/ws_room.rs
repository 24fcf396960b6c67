use roomcast_domain::{DisplayName, JoinCandidate, MemberIdentity, RoomCode, RoomError};
use roomcast_shared::UserData;

use super::*;
use crate::stores::RemovalOutcome;

const INCOMPLETE_CREATE: &str = "Incomplete data to create the room.";
const INCOMPLETE_JOIN: &str = "Incomplete data to join the room.";
const CREATOR_LEFT: &str = "The creator has left the room. The room will close.";

/// Validate a create request at the API boundary.
///
/// Any missing or unusable field collapses to the same client-facing reason.
fn parse_create_request(
    room_code: Option<String>,
    user: Option<UserData>,
) -> Result<(RoomCode, MemberIdentity, DisplayName), RoomError> {
    let incomplete = || RoomError::invalid_input(INCOMPLETE_CREATE);

    let (Some(room_code), Some(user)) = (room_code, user) else {
        return Err(incomplete());
    };
    let (Some(id), Some(user_name)) = (user.id, user.user_name) else {
        return Err(incomplete());
    };

    let code = RoomCode::new(room_code).map_err(|_| incomplete())?;
    let identity = MemberIdentity::persistent(id).map_err(|_| incomplete())?;
    let name = DisplayName::new(user_name).map_err(|_| incomplete())?;
    Ok((code, identity, name))
}

fn parse_join_request(
    room_code: Option<String>,
    user: Option<UserData>,
) -> Result<(RoomCode, JoinCandidate), RoomError> {
    let (Some(room_code), Some(user)) = (room_code, user) else {
        return Err(RoomError::invalid_input(INCOMPLETE_JOIN));
    };
    let code = RoomCode::new(room_code).map_err(|_| RoomError::invalid_input(INCOMPLETE_JOIN))?;
    Ok((code, JoinCandidate::new(user.id, user.user_name)))
}

pub(super) async fn handle_create_room(
    state: &WsState,
    connection_id: ConnectionId,
    room_code: Option<String>,
    user: Option<UserData>,
) -> Option<ServerMessage> {
    let (code, identity, name) = match parse_create_request(room_code, user) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(connection_id = %connection_id, error = %e, "Rejected createRoom payload");
            return Some(ServerMessage::CreateRoomError {
                message: e.to_string(),
            });
        }
    };

    let room = match state
        .rooms
        .create_room(code.clone(), identity, name, connection_id)
        .await
    {
        Ok(room) => room,
        Err(e) => {
            tracing::info!(
                connection_id = %connection_id,
                room_code = %code,
                reason = e.kind(),
                "createRoom failed"
            );
            return Some(ServerMessage::CreateRoomError {
                message: e.to_string(),
            });
        }
    };

    attach(state, connection_id, &code, connection_id).await;

    Some(ServerMessage::RoomCreated {
        room_code: code.to_string(),
        users: members_to_wire(room.members()),
        is_creator: true,
    })
}

pub(super) async fn handle_join_room(
    state: &WsState,
    connection_id: ConnectionId,
    room_code: Option<String>,
    user: Option<UserData>,
) -> Option<ServerMessage> {
    let (code, candidate) = match parse_join_request(room_code, user) {
        Ok(parsed) => parsed,
        Err(e) => {
            return Some(ServerMessage::JoinError {
                message: e.to_string(),
            })
        }
    };

    let joined = match state.rooms.join_room(&code, connection_id, candidate).await {
        Ok(joined) => joined,
        Err(e @ RoomError::RoomFull { .. }) => {
            return Some(ServerMessage::RoomFull {
                message: e.to_string(),
            })
        }
        Err(e) => {
            tracing::info!(
                connection_id = %connection_id,
                room_code = %code,
                reason = e.kind(),
                "joinRoom failed"
            );
            return Some(ServerMessage::JoinError {
                message: e.to_string(),
            });
        }
    };

    attach(state, connection_id, &code, joined.room.creator_connection_id()).await;

    // Confirmation first, then the room-wide update (the joiner receives both)
    let users = members_to_wire(joined.room.members());
    state
        .connections
        .send_to(
            connection_id,
            ServerMessage::JoinedRoom {
                room_code: code.to_string(),
                users: users.clone(),
            },
        )
        .await;
    state
        .connections
        .broadcast_to_room(&code, ServerMessage::GroupUpdate { users }, None)
        .await;

    None
}

/// React to a connection that went away.
///
/// Must run after the connection has been unregistered from the transport.
pub(super) async fn handle_disconnect(state: &WsState, connection_id: ConnectionId) {
    let outcome = state.rooms.remove_connection(connection_id).await;
    apply_removal(state, connection_id, outcome).await;
}

/// Tell the transport what a departure did to the room.
///
/// Other events may have been handled since the registry changed, so a
/// dissolved room's code can already belong to a new room here.
async fn apply_removal(state: &WsState, connection_id: ConnectionId, outcome: RemovalOutcome) {
    match outcome {
        RemovalOutcome::NoOp => {}
        RemovalOutcome::RoomDissolved { code, remaining } => {
            // The departed connection was the creator of the dissolved room
            let detached = state
                .connections
                .close_room_channel(
                    &code,
                    connection_id,
                    ServerMessage::CreatorLeft {
                        message: CREATOR_LEFT.to_string(),
                    },
                    Some(connection_id),
                )
                .await;
            tracing::info!(
                room_code = %code,
                members = remaining.len(),
                detached,
                "Room closed after creator left"
            );
        }
        RemovalOutcome::RoomEmptiedAndRemoved { code } => {
            tracing::debug!(room_code = %code, "Last member left, nothing to notify");
        }
        RemovalOutcome::MembershipChanged { code, members } => {
            state
                .connections
                .broadcast_to_room(
                    &code,
                    ServerMessage::GroupUpdate {
                        users: members_to_wire(&members),
                    },
                    None,
                )
                .await;
        }
    }
}

/// Subscribe a new member to its room channel.
async fn attach(
    state: &WsState,
    connection_id: ConnectionId,
    code: &RoomCode,
    creator: ConnectionId,
) {
    if let Err(e) = state.connections.subscribe(connection_id, code, creator).await {
        tracing::warn!(
            connection_id = %connection_id,
            room_code = %code,
            error = %e,
            "Could not attach connection to room channel"
        );
    }
}
