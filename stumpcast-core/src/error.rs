use thiserror::Error;

/// Durable-storage failure. Surfaced to the caller of the triggering
/// operation; a submission that hits one of these is not accepted and no
/// broadcast happens.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Malformed submission payload, rejected before any state mutation. The
/// submitting connection stays open.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("commentary must not be empty")]
    EmptyCommentary,
}

/// A send to a single connection failed. Isolated to that connection: it is
/// evicted from the registry and nobody else sees the error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("connection channel closed")]
    ChannelClosed,
}

/// Downstream mirror failure. Logged and swallowed, never propagated into
/// the submission path.
#[derive(Error, Debug)]
pub enum PublisherError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}
