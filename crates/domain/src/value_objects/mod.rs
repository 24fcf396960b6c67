//! Validated value objects for rooms and members.

mod game_id;
mod identity;
mod room_code;

pub use game_id::GameId;
pub use identity::{DisplayName, MemberIdentity};
pub use room_code::RoomCode;
