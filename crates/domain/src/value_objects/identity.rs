//! Member identity and display name

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RoomError;

/// Maximum length of a display name
const MAX_DISPLAY_NAME_LENGTH: usize = 64;

/// Prefix of names minted for guest identities
const GUEST_NAME_PREFIX: &str = "guest";

// ============================================================================
// MemberIdentity
// ============================================================================

/// Identity of a room member.
///
/// Positive values are persistent identities handed in by the caller.
/// Negative values are guest identities minted by a room; they are never
/// supplied directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberIdentity(i64);

impl MemberIdentity {
    /// Wrap a persistent identity.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::InvalidInput` if the value is below 1.
    pub fn persistent(value: i64) -> Result<Self, RoomError> {
        if value < 1 {
            return Err(RoomError::invalid_input(
                "Persistent identities must be positive",
            ));
        }
        Ok(Self(value))
    }

    /// Wrap a guest identity minted by a room counter.
    pub(crate) fn guest(value: i64) -> Self {
        debug_assert!(value < 0, "guest identities are negative");
        Self(value)
    }

    /// Whether a caller-supplied raw identity asks for a guest slot.
    pub fn requests_guest(raw: Option<i64>) -> bool {
        !matches!(raw, Some(value) if value >= 1)
    }

    #[inline]
    pub fn value(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_guest(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for MemberIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// DisplayName
// ============================================================================

/// A validated display name (non-empty, <=64 chars, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Create a display name.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::InvalidInput` if the name is empty after trimming
    /// or longer than 64 characters.
    pub fn new(name: impl Into<String>) -> Result<Self, RoomError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RoomError::invalid_input("Display name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            return Err(RoomError::invalid_input(format!(
                "Display name cannot exceed {} characters",
                MAX_DISPLAY_NAME_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Name derived from a guest identity, e.g. `guest-3`.
    pub fn for_guest(identity: MemberIdentity) -> Self {
        Self(format!("{}{}", GUEST_NAME_PREFIX, identity.value()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DisplayName {
    type Error = RoomError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DisplayName> for String {
    fn from(name: DisplayName) -> String {
        name.0
    }
}
