//! Catch-up resolution and fan-out delivery.
//!
//! There is exactly one way a connection ever receives history:
//! [`Broadcaster::deliver_pending`]. Initial connect, the client's explicit
//! history request, and every post-submission broadcast all run the same
//! batch, so "initial load" and "live update" cannot drift apart.

use std::{fmt, sync::Arc};

use stumpcast_core::{CommentaryItem, CommentaryStore, StoreError};
use tracing::{debug, error};
use uuid::Uuid;

use crate::infra::websocket::{Connection, ConnectionRegistry, CursorTracker};

/// Delivers every accepted item to every open connection exactly once, in
/// ascending id order, independently per connection.
#[derive(Clone)]
pub struct Broadcaster {
    store: Arc<dyn CommentaryStore>,
    registry: Arc<ConnectionRegistry>,
    cursors: Arc<CursorTracker>,
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("registry", &self.registry)
            .finish()
    }
}

impl Broadcaster {
    pub fn new(
        store: Arc<dyn CommentaryStore>,
        registry: Arc<ConnectionRegistry>,
        cursors: Arc<CursorTracker>,
    ) -> Self {
        Self {
            store,
            registry,
            cursors,
        }
    }

    /// Everything the connection has not acknowledged yet, ascending by id.
    /// Re-issuable: once a batch has delivered and advanced the cursor, the
    /// next resolve is empty.
    pub async fn resolve(&self, conn_id: Uuid) -> Result<Vec<CommentaryItem>, StoreError> {
        let cursor = self.cursors.get(conn_id);
        self.store.list_since(cursor).await
    }

    /// Kick off a delivery batch for every open connection. Each batch runs
    /// as its own task, so a slow or stalled receiver never holds up the
    /// submission path or any other connection.
    pub fn fan_out(&self) {
        for connection in self.registry.snapshot() {
            let broadcaster = self.clone();
            tokio::spawn(async move {
                broadcaster.deliver_pending(&connection).await;
            });
        }
    }

    /// Deliver the connection's undelivered window, advancing its cursor
    /// item by item so an interrupted batch resumes where it stopped rather
    /// than skipping ahead.
    pub async fn deliver_pending(&self, connection: &Connection) {
        let _batch = connection.begin_delivery().await;

        if !self.registry.contains(connection.id) {
            return;
        }

        let items = match self.resolve(connection.id).await {
            Ok(items) => items,
            Err(err) => {
                error!(connection = %connection.id, error = %err, "catch-up resolve failed");
                return;
            }
        };

        for item in items {
            if connection.send_line(item.display_line()).await.is_err() {
                // Receiver is gone; evict this connection and leave the rest
                // of the fan-out untouched.
                debug!(connection = %connection.id, "connection closed mid-delivery, evicting");
                self.registry.remove(connection.id);
                return;
            }
            self.cursors.advance(connection.id, item.id);
        }
    }
}
