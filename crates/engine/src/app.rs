//! Application state and composition.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::{
    self,
    websocket::{ws_handler, WsState},
    ConnectionManager,
};
use crate::infrastructure::ports::ClockPort;
use crate::stores::RoomRegistry;

/// Main application state.
///
/// Owns the room registry and the connection manager for the lifetime of
/// the process. Tests build a fresh instance for isolation.
pub struct App {
    pub rooms: Arc<RoomRegistry>,
    pub connections: Arc<ConnectionManager>,
}

impl App {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            rooms: Arc::new(RoomRegistry::new(clock)),
            connections: Arc::new(ConnectionManager::new()),
        }
    }

    /// State handed to the WebSocket handlers.
    pub fn ws_state(&self) -> Arc<WsState> {
        Arc::new(WsState {
            rooms: self.rooms.clone(),
            connections: self.connections.clone(),
        })
    }
}

/// Build the full router: HTTP routes, the `/ws` endpoint and layers.
pub fn build_router(app: Arc<App>, cors: Option<CorsLayer>) -> Router {
    let ws_state = app.ws_state();

    // Separate states for HTTP and WebSocket
    let router = api::http::routes()
        .with_state(app)
        .route("/ws", get(ws_handler).with_state(ws_state))
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}
