//! In-memory state storage modules.
//!
//! Stores manage runtime state that lives only as long as the process:
//! - `RoomRegistry` - live rooms, their members and the connection index

pub mod room_registry;

pub use room_registry::{JoinedRoom, RemovalOutcome, RoomRegistry};
