//! Room code - the caller-chosen key of a room

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RoomError;

/// A room code: non-empty, case-sensitive, stored exactly as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Create a room code.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::InvalidInput` if the code is empty.
    pub fn new(code: impl Into<String>) -> Result<Self, RoomError> {
        let code = code.into();
        if code.is_empty() {
            return Err(RoomError::invalid_input("Room code cannot be empty"));
        }
        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = RoomError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> String {
        code.0
    }
}
