//! Room aggregate - an ephemeral lobby with bounded, ordered membership
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: membership is only changed through `admit` and
//!   `remove_member`, so the invariants below cannot be bypassed
//! - **Newtypes**: `RoomCode`, `MemberIdentity`, `DisplayName`, `GameId`
//! - **Valid by construction**: `new()` takes a pre-validated creator
//! - **All-or-nothing**: every fallible method validates before mutating

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::RoomError;
use crate::ids::ConnectionId;
use crate::value_objects::{DisplayName, GameId, MemberIdentity, RoomCode};

/// Capacity of every room.
pub const MAX_MEMBERS_PER_ROOM: usize = 6;

/// Members required before the creator may start the game.
pub const MIN_PLAYERS_TO_START: usize = 2;

/// First identity handed to a guest; later guests count down from here.
const FIRST_GUEST_ID: i64 = -1;

// ============================================================================
// Member
// ============================================================================

/// A live connection that has joined a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    connection_id: ConnectionId,
    identity: MemberIdentity,
    display_name: DisplayName,
}

impl Member {
    pub fn new(
        connection_id: ConnectionId,
        identity: MemberIdentity,
        display_name: DisplayName,
    ) -> Self {
        Self {
            connection_id,
            identity,
            display_name,
        }
    }

    #[inline]
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    #[inline]
    pub fn identity(&self) -> MemberIdentity {
        self.identity
    }

    #[inline]
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }
}

/// What a joining caller claims to be, before the room resolves it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinCandidate {
    /// Raw identity; missing or below 1 asks for a guest identity.
    pub identity: Option<i64>,
    /// Display name; ignored for guests.
    pub display_name: Option<String>,
}

impl JoinCandidate {
    pub fn new(identity: Option<i64>, display_name: Option<String>) -> Self {
        Self {
            identity,
            display_name,
        }
    }

    pub fn guest() -> Self {
        Self::default()
    }
}

// ============================================================================
// Room
// ============================================================================

/// An in-memory lobby keyed by a caller-chosen code.
///
/// # Invariants
///
/// - `members.len() <= max_members` at all times
/// - member identities are unique within the room
/// - `next_guest_id` only decreases, so guest identities are never reused
/// - `creator_connection_id` is fixed at creation
/// - `game_id` is set at most once
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    /// Join order is preserved and visible to clients
    members: Vec<Member>,
    creator_connection_id: ConnectionId,
    max_members: usize,
    next_guest_id: i64,
    game_id: Option<GameId>,
    /// Last broadcast game state (last write wins, never interpreted)
    game_state: Option<Value>,
}

impl Room {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create a room whose only member is its creator.
    ///
    /// The creator always holds a persistent identity; guests cannot create
    /// rooms, which `MemberIdentity::persistent` already guarantees.
    pub fn new(
        code: RoomCode,
        creator_connection_id: ConnectionId,
        creator_identity: MemberIdentity,
        creator_name: DisplayName,
    ) -> Self {
        Self {
            code,
            members: vec![Member::new(
                creator_connection_id,
                creator_identity,
                creator_name,
            )],
            creator_connection_id,
            max_members: MAX_MEMBERS_PER_ROOM,
            next_guest_id: FIRST_GUEST_ID,
            game_id: None,
            game_state: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Members in join order.
    #[inline]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[inline]
    pub fn creator_connection_id(&self) -> ConnectionId {
        self.creator_connection_id
    }

    #[inline]
    pub fn max_members(&self) -> usize {
        self.max_members
    }

    /// Identity the next guest will receive.
    #[inline]
    pub fn next_guest_id(&self) -> i64 {
        self.next_guest_id
    }

    #[inline]
    pub fn game_id(&self) -> Option<&GameId> {
        self.game_id.as_ref()
    }

    #[inline]
    pub fn game_state(&self) -> Option<&Value> {
        self.game_state.as_ref()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_members
    }

    pub fn is_creator(&self, connection_id: ConnectionId) -> bool {
        self.creator_connection_id == connection_id
    }

    pub fn has_connection(&self, connection_id: ConnectionId) -> bool {
        self.members
            .iter()
            .any(|m| m.connection_id == connection_id)
    }

    pub fn has_identity(&self, identity: MemberIdentity) -> bool {
        self.members.iter().any(|m| m.identity == identity)
    }

    /// Connection ids of every member, in join order.
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.connection_id).collect()
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Admit a new member at the end of the member list.
    ///
    /// Guests (missing or non-positive identity) get the next guest identity
    /// and the name `guest<identity>`. The duplicate check runs against the
    /// resolved identity, so a guest can never collide with anyone.
    ///
    /// # Errors
    ///
    /// - `RoomFull` if the room is at capacity
    /// - `InvalidInput` if a persistent identity comes without a usable name
    /// - `AlreadyJoined` if the resolved identity is already a member
    pub fn admit(
        &mut self,
        connection_id: ConnectionId,
        candidate: JoinCandidate,
    ) -> Result<Member, RoomError> {
        if self.is_full() {
            return Err(RoomError::RoomFull {
                max_members: self.max_members,
            });
        }

        let is_guest = MemberIdentity::requests_guest(candidate.identity);
        let member = match candidate.identity {
            Some(raw) if !is_guest => {
                let identity = MemberIdentity::persistent(raw)?;
                let name = candidate
                    .display_name
                    .ok_or_else(|| RoomError::invalid_input("Incomplete data to join the room."))
                    .and_then(DisplayName::new)?;
                Member::new(connection_id, identity, name)
            }
            _ => {
                let identity = MemberIdentity::guest(self.next_guest_id);
                Member::new(connection_id, identity, DisplayName::for_guest(identity))
            }
        };

        if self.has_identity(member.identity) {
            return Err(RoomError::AlreadyJoined);
        }

        // Commit
        if is_guest {
            self.next_guest_id -= 1;
        }
        self.members.push(member.clone());
        Ok(member)
    }

    /// Remove the member holding `connection_id`, keeping the others in order.
    pub fn remove_member(&mut self, connection_id: ConnectionId) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|m| m.connection_id == connection_id)?;
        Some(self.members.remove(index))
    }

    // =========================================================================
    // Game
    // =========================================================================

    /// Start the game, minting its id from the room code and `started_at`.
    ///
    /// Membership is left untouched.
    ///
    /// # Errors
    ///
    /// - `NotAuthorized` if `requester` is not the creator's connection
    /// - `GameAlreadyStarted` if a game id was already minted
    /// - `NotEnoughPlayers` if fewer than two members are present
    pub fn start_game(
        &mut self,
        requester: ConnectionId,
        started_at: DateTime<Utc>,
    ) -> Result<GameId, RoomError> {
        if !self.is_creator(requester) {
            return Err(RoomError::NotAuthorized);
        }
        if self.game_id.is_some() {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.members.len() < MIN_PLAYERS_TO_START {
            return Err(RoomError::NotEnoughPlayers {
                required: MIN_PLAYERS_TO_START,
                current: self.members.len(),
            });
        }

        let game_id = GameId::mint(&self.code, started_at);
        self.game_id = Some(game_id.clone());
        Ok(game_id)
    }

    /// Overwrite the cached game state unconditionally.
    ///
    /// No version or ordering check: concurrent writers race and the last
    /// one applied wins.
    pub fn record_game_state(&mut self, state: Value) {
        self.game_state = Some(state);
    }
}
