//! WebSocket message types for lobby communication
//!
//! Every frame is a JSON object tagged by `"type"`, whose value is the event
//! name (`createRoom`, `groupUpdate`, ...). Field names are camelCase.
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Removing variants requires major version bump
//! - Renaming variants is a breaking change

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Shared payloads
// =============================================================================

/// User descriptor sent by a client when creating or joining a room.
///
/// Both fields are optional on the wire so that incomplete payloads reach
/// the server and are rejected with a readable reason instead of a parse
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    /// Persistent identity; missing or below 1 asks for a guest identity
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
}

impl UserData {
    pub fn new(id: i64, user_name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            user_name: Some(user_name.into()),
        }
    }

    pub fn guest() -> Self {
        Self {
            id: Some(0),
            user_name: None,
        }
    }
}

/// One room member as shown to clients, in join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMemberData {
    pub socket_id: String,
    pub db_user_id: i64,
    pub user_name: String,
}

// =============================================================================
// Client Messages (client → server)
// =============================================================================

/// Messages from a lobby client to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Create a room and become its creator
    CreateRoom {
        #[serde(default)]
        room_code: Option<String>,
        #[serde(default)]
        user: Option<UserData>,
    },
    /// Join an existing room as a member
    JoinRoom {
        #[serde(default)]
        room_code: Option<String>,
        #[serde(default)]
        user: Option<UserData>,
    },
    /// Creator starts the game
    StartGame {
        #[serde(default)]
        room_code: String,
    },
    /// Subscribe to a room's broadcasts without becoming a member
    JoinBoardGameRoom {
        #[serde(default)]
        room_code: String,
    },
    /// Relay an opaque game state to the rest of the room
    BroadcastGameState {
        #[serde(default)]
        room_code: String,
        #[serde(default)]
        game_state: Value,
    },
    /// Heartbeat ping
    Heartbeat,
}

impl ClientMessage {
    /// Decode a client frame.
    ///
    /// A known event whose fields carry the wrong JSON types decodes as that
    /// event with every field absent, so the event's own validation rejects
    /// it. Only frames that are not JSON, or that name no known event, fail.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        let event = value.get("type").cloned();
        match serde_json::from_value(value) {
            Ok(msg) => Ok(msg),
            Err(e) => match event {
                Some(event) => {
                    serde_json::from_value(serde_json::json!({ "type": event })).map_err(|_| e)
                }
                None => Err(e),
            },
        }
    }
}

// =============================================================================
// Server Messages (server → client)
// =============================================================================

/// Messages from the server to lobby clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Sent to the creator after a room was created
    RoomCreated {
        room_code: String,
        users: Vec<RoomMemberData>,
        is_creator: bool,
    },
    CreateRoomError {
        message: String,
    },
    /// Sent to the joiner after a successful join
    JoinedRoom {
        room_code: String,
        users: Vec<RoomMemberData>,
    },
    /// Room-wide membership snapshot
    GroupUpdate {
        users: Vec<RoomMemberData>,
    },
    JoinError {
        message: String,
    },
    RoomFull {
        message: String,
    },
    /// Room-wide game start announcement
    GameStarting {
        game_id: String,
    },
    StartGameError {
        message: String,
    },
    ErrorJoiningGameRoom {
        message: String,
    },
    /// Relayed game state, sent to everyone in the room but the sender
    GameStateUpdated {
        game_state: Value,
    },
    /// Room-wide notice that the creator left and the room is closing
    CreatorLeft {
        message: String,
    },
    /// Heartbeat response
    Pong,
    /// Protocol-level error (unparsable frame)
    Error {
        code: String,
        message: String,
    },
}
