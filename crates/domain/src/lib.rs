//! Roomcast domain.
//!
//! Rooms, members and the rules that govern them. Nothing here performs I/O
//! or knows about transports; the engine owns those concerns.

pub mod aggregates;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use aggregates::{JoinCandidate, Member, Room, MAX_MEMBERS_PER_ROOM, MIN_PLAYERS_TO_START};
pub use error::RoomError;
pub use ids::ConnectionId;
pub use value_objects::{DisplayName, GameId, MemberIdentity, RoomCode};
