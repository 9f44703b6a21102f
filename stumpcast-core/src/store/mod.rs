//! Persistent commentary log and score storage.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{CommentaryItem, ScoreDelta, ScoreState};

mod sqlite;

pub use sqlite::SqliteCommentaryStore;

/// Durable, append-only commentary log plus the singleton score record.
///
/// All methods persist before returning success; no acknowledgment reaches
/// the caller until the underlying write has committed. Writes to the log
/// and to the score are serialized by the backing storage, so the order in
/// which submissions commit is the order every reader observes.
#[async_trait]
pub trait CommentaryStore: Send + Sync {
    /// Append a commentary item. The assigned id is strictly greater than
    /// every previously assigned id; the item carries a snapshot of the
    /// score as of this append.
    async fn append(&self, text: &str) -> Result<CommentaryItem, StoreError>;

    /// All items with id greater than `cursor`, ascending by id. Finite and
    /// re-issuable: callers may call it repeatedly with different cursors.
    async fn list_since(&self, cursor: u64) -> Result<Vec<CommentaryItem>, StoreError>;

    /// Atomically increment both score fields, returning the resulting
    /// state.
    async fn apply_score_delta(&self, delta: ScoreDelta) -> Result<ScoreState, StoreError>;

    /// Current score.
    async fn score(&self) -> Result<ScoreState, StoreError>;

    /// The submission path: apply the delta and append the item in a single
    /// transaction, so a failed append never leaves a dangling score
    /// mutation. The item's snapshot reflects the score after its own delta.
    async fn record(&self, text: &str, delta: ScoreDelta) -> Result<CommentaryItem, StoreError>;
}
