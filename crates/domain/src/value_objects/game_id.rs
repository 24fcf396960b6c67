//! Game id minted when a room starts its game

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RoomCode;

/// Identifier of a started game, unique per (room code, timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Mint the id for a game started in `code` at `started_at`.
    ///
    /// Format: `game_<code>_<unix millis>`.
    pub fn mint(code: &RoomCode, started_at: DateTime<Utc>) -> Self {
        Self(format!("game_{}_{}", code, started_at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<GameId> for String {
    fn from(id: GameId) -> String {
        id.0
    }
}
