use anyhow::Context;

use async_trait::async_trait;

use bb8_redis::{bb8::Pool, redis::AsyncCommands, RedisConnectionManager};

use super::{FeedSource, StoreError, StoreResult};

/// Redis-backed delay feed cache, read with a plain `GET`
#[derive(Clone)]
pub struct RedisFeedSource {
    pool: Pool<RedisConnectionManager>,
}

impl RedisFeedSource {
    /// Connections are opened on first use, so a missing Redis does not stop startup
    pub fn connect_lazy(redis_url: &str) -> anyhow::Result<Self> {
        let manager = RedisConnectionManager::new(redis_url).context("Invalid Redis URL")?;
        let pool = Pool::builder().build_unchecked(manager);
        Ok(Self { pool })
    }
}

impl std::fmt::Debug for RedisFeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisFeedSource").finish_non_exhaustive()
    }
}

#[async_trait]
impl FeedSource for RedisFeedSource {
    #[tracing::instrument("Read the delay feed", skip(self))]
    async fn fetch(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to acquire a Redis connection")
            .map_err(StoreError::Feed)?;

        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .context("Failed to GET the delay feed")
            .map_err(StoreError::Feed)?;
        Ok(value)
    }
}
