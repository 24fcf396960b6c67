//! Room error taxonomy
//!
//! Every variant is terminal for the request that triggered it. The `Display`
//! text is the human-readable reason sent back to the requesting connection,
//! so keep it free of internal detail.

use thiserror::Error;

use crate::value_objects::RoomCode;

/// Failure of a room operation.
///
/// A room operation either fully applies or returns one of these without
/// changing any state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Request payload is missing or malformed
    #[error("{0}")]
    InvalidInput(String),

    /// Another live room already uses this code
    #[error("This room code is already in use. Try another one.")]
    RoomCodeTaken { code: RoomCode },

    /// No live room maps to this code
    #[error("The room does not exist.")]
    RoomNotFound,

    /// Room is at capacity
    #[error("The room is full.")]
    RoomFull { max_members: usize },

    /// Resolved identity is already a member of the room
    #[error("You are already in this room.")]
    AlreadyJoined,

    /// Connection is already a member of a live room
    #[error("You are already in another room.")]
    AlreadyInRoom { code: RoomCode },

    /// Requester does not hold creator authority
    #[error("Only the room creator can start the game.")]
    NotAuthorized,

    /// Too few members to start a game
    #[error("Not enough players to start the game.")]
    NotEnoughPlayers { required: usize, current: usize },

    /// Game id was already minted for this room
    #[error("The game has already started.")]
    GameAlreadyStarted,
}

impl RoomError {
    /// Creates an invalid input error carrying the reason shown to the client.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Short machine-readable name of the variant, for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::RoomCodeTaken { .. } => "room_code_taken",
            Self::RoomNotFound => "room_not_found",
            Self::RoomFull { .. } => "room_full",
            Self::AlreadyJoined => "already_joined",
            Self::AlreadyInRoom { .. } => "already_in_room",
            Self::NotAuthorized => "not_authorized",
            Self::NotEnoughPlayers { .. } => "not_enough_players",
            Self::GameAlreadyStarted => "game_already_started",
        }
    }
}
