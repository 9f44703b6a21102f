//! Best-effort mirroring of accepted commentary to an external stream sink.
//!
//! The mirror is fire-and-forget: the submission path spawns the publish and
//! never joins it, and a failing sink only ever shows up in the logs.
//! Correctness of client delivery does not depend on anything here.

use async_trait::async_trait;

use crate::error::PublisherError;

mod redis_stream;

pub use redis_stream::RedisStreamPublisher;

/// Downstream sink for accepted commentary items.
#[async_trait]
pub trait DownstreamPublisher: Send + Sync {
    /// Make sure the backing channel exists. Idempotent; repeated calls when
    /// the channel is already there are a no-op, not an error. Runs lazily
    /// before the first publish.
    async fn ensure_channel(&self) -> Result<(), PublisherError>;

    /// Mirror one item to the sink.
    async fn publish(&self, key: &str, text: &str) -> Result<(), PublisherError>;
}

/// Sink used when no downstream is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl DownstreamPublisher for NoopPublisher {
    async fn ensure_channel(&self) -> Result<(), PublisherError> {
        Ok(())
    }

    async fn publish(&self, _key: &str, _text: &str) -> Result<(), PublisherError> {
        Ok(())
    }
}
