use std::{fmt, sync::Arc};

use dashmap::DashMap;
use uuid::Uuid;

use crate::infra::websocket::{Connection, CursorTracker};

/// Registry of open connections, shared by every broadcast.
///
/// Add, remove, and iterate run concurrently; senders work from a snapshot
/// so no map lock is ever held across a suspension point.
#[derive(Clone)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<Uuid, Arc<Connection>>>,
    cursors: Arc<CursorTracker>,
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connection_count", &self.connections.len())
            .finish()
    }
}

impl ConnectionRegistry {
    pub fn new(cursors: Arc<CursorTracker>) -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
            cursors,
        }
    }

    /// Register a connection and start tracking its cursor at 0.
    pub fn add(&self, connection: Arc<Connection>) {
        self.cursors.track(connection.id);
        self.connections.insert(connection.id, connection);
    }

    /// Remove a connection and forget its cursor. Idempotent; both the
    /// socket handler and an evicting delivery batch may race into this.
    pub fn remove(&self, conn_id: Uuid) {
        self.connections.remove(&conn_id);
        self.cursors.forget(conn_id);
    }

    pub fn contains(&self, conn_id: Uuid) -> bool {
        self.connections.contains_key(&conn_id)
    }

    /// All currently open connections.
    pub fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
