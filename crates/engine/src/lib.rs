//! Roomcast Engine library.
//!
//! Server side of the roomcast lobby service: in-memory rooms keyed by a
//! client-chosen code, relayed over WebSockets.
//!
//! ## Structure
//!
//! - `stores/` - The room registry (all room state lives here)
//! - `infrastructure/` - Ports and their implementations (clock)
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition
//! - `config` - Environment configuration

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod stores;

pub use app::{build_router, App};
pub use config::EngineConfig;
