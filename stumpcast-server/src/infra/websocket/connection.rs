use std::fmt;

use stumpcast_core::DeliveryError;
use tokio::sync::{Mutex, MutexGuard, mpsc};
use uuid::Uuid;

/// One live client channel.
///
/// The registry owns the canonical set of connections; delivery state (the
/// cursor) lives in the tracker keyed by `id`. The embedded lock serializes
/// delivery batches so two racing broadcasts can never interleave items to
/// the same connection out of id order.
pub struct Connection {
    /// Unique connection ID
    pub id: Uuid,
    /// Channel draining to this connection's socket writer task
    sender: mpsc::Sender<String>,
    /// Held for the duration of one delivery batch
    delivery: Mutex<()>,
    /// Connect timestamp
    pub connected_at: i64,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("channel_closed", &self.sender.is_closed())
            .field("connected_at", &self.connected_at)
            .finish()
    }
}

impl Connection {
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender,
            delivery: Mutex::new(()),
            connected_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Take this connection's delivery slot. At most one batch sends to a
    /// connection at a time; a second trigger queues here and then finds
    /// whatever the first batch already delivered reflected in the cursor.
    pub async fn begin_delivery(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().await
    }

    /// Queue one formatted line for this connection.
    pub async fn send_line(&self, line: String) -> Result<(), DeliveryError> {
        self.sender
            .send(line)
            .await
            .map_err(|_| DeliveryError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
