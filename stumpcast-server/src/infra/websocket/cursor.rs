use dashmap::DashMap;
use uuid::Uuid;

/// Last-acknowledged item id per live connection.
///
/// Exclusive-write semantics: only the fan-out delivery path advances a
/// cursor, and only after a send has been confirmed for that specific
/// connection.
#[derive(Debug, Default)]
pub struct CursorTracker {
    cursors: DashMap<Uuid, u64>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a connection at cursor 0.
    pub fn track(&self, conn_id: Uuid) {
        self.cursors.insert(conn_id, 0);
    }

    /// Last acknowledged id, 0 for unknown connections.
    pub fn get(&self, conn_id: Uuid) -> u64 {
        self.cursors.get(&conn_id).map(|cursor| *cursor).unwrap_or(0)
    }

    /// Advance to `item_id` if it is ahead of the current cursor. An
    /// out-of-order confirmation never moves a cursor backward, and a
    /// forgotten connection is never resurrected.
    pub fn advance(&self, conn_id: Uuid, item_id: u64) {
        if let Some(mut cursor) = self.cursors.get_mut(&conn_id) {
            if item_id > *cursor {
                *cursor = item_id;
            }
        }
    }

    /// Drop all accounting for a closed connection.
    pub fn forget(&self, conn_id: Uuid) {
        self.cursors.remove(&conn_id);
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}
