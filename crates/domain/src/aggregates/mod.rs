//! Aggregates with enforced invariants.

pub mod room;

pub use room::{JoinCandidate, Member, Room, MAX_MEMBERS_PER_ROOM, MIN_PLAYERS_TO_START};
