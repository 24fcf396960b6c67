//! Room registry - the owner of every live room.
//!
//! Holds the room-code map and the connection → room index behind a single
//! lock. Every mutating operation takes the write lock and runs to completion
//! without awaiting, so the two maps are always updated together and no
//! operation can observe another half-applied.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use roomcast_domain::{
    ConnectionId, DisplayName, GameId, JoinCandidate, Member, MemberIdentity, Room, RoomCode,
    RoomError,
};

use crate::infrastructure::ports::ClockPort;

/// Result of a successful join.
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    /// Room after the join, members in join order
    pub room: Room,
    /// The member that was just admitted, with its resolved identity
    pub member: Member,
}

/// What happened to the room of a connection that went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Connection was not a member of any room.
    NoOp,
    /// The creator left; the room is gone and the remaining members must be
    /// told and detached from its channel.
    RoomDissolved {
        code: RoomCode,
        remaining: Vec<ConnectionId>,
    },
    /// The last member left; the room is gone.
    RoomEmptiedAndRemoved { code: RoomCode },
    /// A member left and the room lives on.
    MembershipChanged { code: RoomCode, members: Vec<Member> },
}

#[derive(Default)]
struct RegistryState {
    rooms: HashMap<RoomCode, Room>,
    /// Reverse lookup; a connection belongs to at most one room
    connection_rooms: HashMap<ConnectionId, RoomCode>,
}

impl RegistryState {
    fn ensure_not_in_room(&self, connection_id: ConnectionId) -> Result<(), RoomError> {
        match self.connection_rooms.get(&connection_id) {
            Some(code) => Err(RoomError::AlreadyInRoom { code: code.clone() }),
            None => Ok(()),
        }
    }

    fn drop_room(&mut self, code: &RoomCode) -> Option<Room> {
        let room = self.rooms.remove(code)?;
        for connection_id in room.connection_ids() {
            self.connection_rooms.remove(&connection_id);
        }
        Some(room)
    }
}

/// In-memory store of rooms, constructed once and shared by handle.
pub struct RoomRegistry {
    state: RwLock<RegistryState>,
    clock: Arc<dyn ClockPort>,
}

impl RoomRegistry {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            clock,
        }
    }

    /// Create a room with the caller as its creator and only member.
    ///
    /// # Errors
    ///
    /// - `RoomCodeTaken` if a live room already uses `code`
    /// - `AlreadyInRoom` if the connection is a member of another room
    pub async fn create_room(
        &self,
        code: RoomCode,
        creator_identity: MemberIdentity,
        creator_name: DisplayName,
        creator_connection_id: ConnectionId,
    ) -> Result<Room, RoomError> {
        let mut state = self.state.write().await;

        if state.rooms.contains_key(&code) {
            return Err(RoomError::RoomCodeTaken { code });
        }
        state.ensure_not_in_room(creator_connection_id)?;

        let room = Room::new(
            code.clone(),
            creator_connection_id,
            creator_identity,
            creator_name,
        );
        state
            .connection_rooms
            .insert(creator_connection_id, code.clone());
        state.rooms.insert(code.clone(), room.clone());

        tracing::info!(
            room_code = %code,
            connection_id = %creator_connection_id,
            "Room created"
        );
        Ok(room)
    }

    /// Admit a connection to an existing room.
    ///
    /// # Errors
    ///
    /// Checked in order:
    ///
    /// - `RoomNotFound` if `code` is not live
    /// - `RoomFull` if the room is at capacity
    /// - `AlreadyJoined` if the connection (or its resolved identity) is
    ///   already in this room
    /// - `AlreadyInRoom` if the connection is a member of another room
    /// - `InvalidInput` from the room's admission rules
    pub async fn join_room(
        &self,
        code: &RoomCode,
        connection_id: ConnectionId,
        candidate: JoinCandidate,
    ) -> Result<JoinedRoom, RoomError> {
        let mut state = self.state.write().await;

        let room = state.rooms.get(code).ok_or(RoomError::RoomNotFound)?;
        if room.is_full() {
            return Err(RoomError::RoomFull {
                max_members: room.max_members(),
            });
        }
        match state.connection_rooms.get(&connection_id) {
            Some(current) if current == code => return Err(RoomError::AlreadyJoined),
            Some(current) => {
                return Err(RoomError::AlreadyInRoom {
                    code: current.clone(),
                })
            }
            None => {}
        }

        let room = state.rooms.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        let member = room.admit(connection_id, candidate)?;
        let room = room.clone();
        state.connection_rooms.insert(connection_id, code.clone());

        tracing::info!(
            room_code = %code,
            connection_id = %connection_id,
            identity = %member.identity(),
            members = room.len(),
            "Member joined room"
        );
        Ok(JoinedRoom { room, member })
    }

    /// Start the game of a room on behalf of its creator.
    ///
    /// # Errors
    ///
    /// - `RoomNotFound` if `code` is not live
    /// - `NotAuthorized`, `GameAlreadyStarted`, `NotEnoughPlayers` from the room
    pub async fn start_game(
        &self,
        code: &RoomCode,
        requester_connection_id: ConnectionId,
    ) -> Result<GameId, RoomError> {
        let mut state = self.state.write().await;
        let room = state.rooms.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        let game_id = room.start_game(requester_connection_id, self.clock.now())?;

        tracing::info!(room_code = %code, game_id = %game_id, "Game started");
        Ok(game_id)
    }

    /// Overwrite the cached game state of a room (last write wins).
    ///
    /// # Errors
    ///
    /// `RoomNotFound` if `code` is not live. Relays treat this as a silent
    /// drop rather than something to report.
    pub async fn record_game_state(
        &self,
        code: &RoomCode,
        game_state: Value,
    ) -> Result<(), RoomError> {
        let mut state = self.state.write().await;
        let room = state.rooms.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        room.record_game_state(game_state);
        Ok(())
    }

    /// Remove a departed connection from its room, if it had one.
    ///
    /// Creator departure wins over the empty-room case: a creator leaving as
    /// the last member still dissolves the room.
    pub async fn remove_connection(&self, connection_id: ConnectionId) -> RemovalOutcome {
        let mut state = self.state.write().await;

        let Some(code) = state.connection_rooms.remove(&connection_id) else {
            return RemovalOutcome::NoOp;
        };
        let Some(room) = state.rooms.get_mut(&code) else {
            tracing::error!(
                room_code = %code,
                connection_id = %connection_id,
                "Connection index points at a missing room"
            );
            return RemovalOutcome::NoOp;
        };

        if room.is_creator(connection_id) {
            let remaining = room
                .connection_ids()
                .into_iter()
                .filter(|id| *id != connection_id)
                .collect();
            state.drop_room(&code);
            tracing::info!(
                room_code = %code,
                connection_id = %connection_id,
                "Creator disconnected, room dissolved"
            );
            return RemovalOutcome::RoomDissolved { code, remaining };
        }

        room.remove_member(connection_id);
        if room.is_empty() {
            state.drop_room(&code);
            tracing::info!(room_code = %code, "Room emptied and removed");
            return RemovalOutcome::RoomEmptiedAndRemoved { code };
        }

        let members = room.members().to_vec();
        tracing::info!(
            room_code = %code,
            connection_id = %connection_id,
            members = members.len(),
            "Member left room"
        );
        RemovalOutcome::MembershipChanged { code, members }
    }

    // =========================================================================
    // Read-only queries
    // =========================================================================

    pub async fn contains(&self, code: &RoomCode) -> bool {
        self.state.read().await.rooms.contains_key(code)
    }

    /// Clone of a live room.
    pub async fn snapshot(&self, code: &RoomCode) -> Option<Room> {
        self.state.read().await.rooms.get(code).cloned()
    }

    /// Connection that created the live room under `code`.
    pub async fn creator_of(&self, code: &RoomCode) -> Option<ConnectionId> {
        self.state
            .read()
            .await
            .rooms
            .get(code)
            .map(Room::creator_connection_id)
    }

    pub async fn room_count(&self) -> usize {
        self.state.read().await.rooms.len()
    }

    /// Room the connection is currently a member of.
    pub async fn room_of(&self, connection_id: ConnectionId) -> Option<RoomCode> {
        self.state
            .read()
            .await
            .connection_rooms
            .get(&connection_id)
            .cloned()
    }
}
