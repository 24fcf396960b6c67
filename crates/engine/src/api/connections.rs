//! Connection management for WebSocket clients.
//!
//! Tracks connected clients, their outbound channels, and which room
//! broadcast channels each one is subscribed to. This is the transport
//! capability the room handlers call into; it knows nothing about members.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use roomcast_domain::{ConnectionId, RoomCode};
use roomcast_shared::ServerMessage;

/// Handshake details supplied by the client when connecting.
///
/// Only used for logging; room logic never reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handshake {
    pub db_user_id: Option<String>,
    pub user_name: Option<String>,
}

/// Information about a connected client.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Unique ID for this connection
    pub connection_id: ConnectionId,
    pub handshake: Handshake,
    /// Room broadcast channels this connection receives, each mapped to the
    /// connection that created the room. A code can be reused as soon as its
    /// room is gone, and the creator tells the two rooms apart.
    pub channels: HashMap<RoomCode, ConnectionId>,
}

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    /// Map of connection_id -> (ConnectionInfo, sender channel)
    connections: RwLock<HashMap<ConnectionId, (ConnectionInfo, mpsc::Sender<ServerMessage>)>>,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    pub async fn register(
        &self,
        connection_id: ConnectionId,
        handshake: Handshake,
        sender: mpsc::Sender<ServerMessage>,
    ) {
        let info = ConnectionInfo {
            connection_id,
            handshake,
            channels: HashMap::new(),
        };
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection, dropping all of its channel subscriptions.
    pub async fn unregister(&self, connection_id: ConnectionId) -> Option<ConnectionInfo> {
        let mut connections = self.connections.write().await;
        let removed = connections.remove(&connection_id).map(|(info, _)| info);
        if removed.is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
        removed
    }

    /// Get connection info by ID.
    pub async fn get(&self, connection_id: ConnectionId) -> Option<ConnectionInfo> {
        let connections = self.connections.read().await;
        connections.get(&connection_id).map(|(info, _)| info.clone())
    }

    /// Attach a connection to the broadcast channel of the room `creator`
    /// created under `code`.
    ///
    /// Idempotent. A leftover subscription to an earlier room with the same
    /// code is replaced. Returns `true` if the subscription is new.
    pub async fn subscribe(
        &self,
        connection_id: ConnectionId,
        code: &RoomCode,
        creator: ConnectionId,
    ) -> Result<bool, ConnectionError> {
        let mut connections = self.connections.write().await;
        let (info, _) = connections
            .get_mut(&connection_id)
            .ok_or(ConnectionError::NotFound)?;
        let added = info.channels.insert(code.clone(), creator) != Some(creator);
        if added {
            tracing::debug!(
                connection_id = %connection_id,
                room_code = %code,
                creator = %creator,
                "Subscribed to room channel"
            );
        }
        Ok(added)
    }

    /// Detach every connection from a room's broadcast channel.
    ///
    /// Returns how many connections were detached.
    pub async fn unsubscribe_all(&self, code: &RoomCode) -> usize {
        let mut connections = self.connections.write().await;
        detach(&mut connections, code, None)
    }

    /// Send a final notice to the channel of the room `creator` created under
    /// `code`, then detach its subscribers.
    ///
    /// Subscriptions to a newer room that reuses the code are left alone,
    /// even when that room was created before this call.
    pub async fn close_room_channel(
        &self,
        code: &RoomCode,
        creator: ConnectionId,
        notice: ServerMessage,
        except: Option<ConnectionId>,
    ) -> usize {
        let mut connections = self.connections.write().await;
        for (info, sender) in connections.values() {
            if !on_channel(info, code, Some(creator)) || Some(info.connection_id) == except {
                continue;
            }
            if let Err(e) = sender.try_send(notice.clone()) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    room_code = %code,
                    error = %e,
                    "Failed to send closing notice"
                );
            }
        }
        detach(&mut connections, code, Some(creator))
    }

    /// Get all connections subscribed to a room channel.
    pub async fn room_subscribers(&self, code: &RoomCode) -> Vec<ConnectionId> {
        let connections = self.connections.read().await;
        connections
            .values()
            .filter(|(info, _)| info.channels.contains_key(code))
            .map(|(info, _)| info.connection_id)
            .collect()
    }

    /// Send a message to a single connection.
    pub async fn send_to(&self, connection_id: ConnectionId, message: ServerMessage) {
        let connections = self.connections.read().await;
        let Some((_, sender)) = connections.get(&connection_id) else {
            tracing::debug!(connection_id = %connection_id, "Send to unknown connection dropped");
            return;
        };
        if let Err(e) = sender.try_send(message) {
            tracing::warn!(
                connection_id = %connection_id,
                error = %e,
                "Failed to send message"
            );
        }
    }

    /// Broadcast a message to every subscriber of a room channel,
    /// optionally skipping one connection (usually the sender).
    pub async fn broadcast_to_room(
        &self,
        code: &RoomCode,
        message: ServerMessage,
        except: Option<ConnectionId>,
    ) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if !info.channels.contains_key(code) || Some(info.connection_id) == except {
                continue;
            }
            if let Err(e) = sender.try_send(message.clone()) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    room_code = %code,
                    error = %e,
                    "Failed to broadcast message"
                );
            }
        }
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `info` listens on `code`, restricted to one room's creator if given.
fn on_channel(info: &ConnectionInfo, code: &RoomCode, creator: Option<ConnectionId>) -> bool {
    match (info.channels.get(code), creator) {
        (Some(owner), Some(creator)) => *owner == creator,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn detach(
    connections: &mut HashMap<ConnectionId, (ConnectionInfo, mpsc::Sender<ServerMessage>)>,
    code: &RoomCode,
    creator: Option<ConnectionId>,
) -> usize {
    let mut detached = 0;
    for (info, _) in connections.values_mut() {
        if on_channel(info, code, creator) {
            info.channels.remove(code);
            detached += 1;
        }
    }
    tracing::debug!(room_code = %code, detached, "Room channel cleared");
    detached
}

/// Errors that can occur during connection operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("Connection not found")]
    NotFound,
}
