use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::PublisherError;
use crate::publish::DownstreamPublisher;

/// Consumer group created alongside the stream so downstream readers can
/// attach with XREADGROUP.
const CONSUMER_GROUP: &str = "stumpcast";

/// Mirrors accepted commentary onto a Redis Stream via XADD.
#[derive(Clone)]
pub struct RedisStreamPublisher {
    conn: ConnectionManager,
    topic: String,
    group_ready: OnceCell<()>,
}

impl fmt::Debug for RedisStreamPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStreamPublisher")
            .field("topic", &self.topic)
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisStreamPublisher {
    pub async fn connect(
        redis_url: &str,
        topic: impl Into<String>,
    ) -> Result<Self, PublisherError> {
        let topic = topic.into();
        info!("Connecting to Redis stream sink at {redis_url}");

        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        info!(topic = %topic, "Connected to Redis stream sink");

        Ok(Self {
            conn,
            topic,
            group_ready: OnceCell::new(),
        })
    }
}

#[async_trait]
impl DownstreamPublisher for RedisStreamPublisher {
    async fn ensure_channel(&self) -> Result<(), PublisherError> {
        self.group_ready
            .get_or_try_init(|| async {
                let mut conn = self.conn.clone();
                match redis::cmd("XGROUP")
                    .arg("CREATE")
                    .arg(&self.topic)
                    .arg(CONSUMER_GROUP)
                    .arg("$")
                    .arg("MKSTREAM")
                    .query_async::<()>(&mut conn)
                    .await
                {
                    Ok(()) => {
                        debug!(topic = %self.topic, "Created downstream stream");
                        Ok(())
                    }
                    // Stream and group already exist from an earlier run.
                    Err(err) if err.code() == Some("BUSYGROUP") => Ok(()),
                    Err(err) => Err(PublisherError::from(err)),
                }
            })
            .await
            .map(|_| ())
    }

    async fn publish(&self, key: &str, text: &str) -> Result<(), PublisherError> {
        self.ensure_channel().await?;

        let mut conn = self.conn.clone();
        redis::cmd("XADD")
            .arg(&self.topic)
            .arg("*")
            .arg("key")
            .arg(key)
            .arg("text")
            .arg(text)
            .query_async::<String>(&mut conn)
            .await?;

        debug!(topic = %self.topic, "Mirrored commentary item downstream");
        Ok(())
    }
}
