//! Roomcast Protocol - Shared types for server and client communication
//!
//! This crate contains the WebSocket wire format exchanged between the
//! server and lobby clients:
//! - `ClientMessage` - events a client sends
//! - `ServerMessage` - events the server emits, addressed or room-wide
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde and serde_json
//! 2. **No business logic** - Pure data types and serialization
//! 3. **No domain types** - raw strings and integers on the wire

pub mod messages;

pub use messages::{ClientMessage, RoomMemberData, ServerMessage, UserData};
