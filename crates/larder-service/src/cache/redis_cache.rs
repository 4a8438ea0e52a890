//! Redis-based key-value store.

use super::KvStore;
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool};
use larder_core::{LarderError, LarderResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default bound for a single Redis command, connection checkout included.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(250);

/// Keys requested per SCAN round trip.
const SCAN_BATCH: usize = 500;

/// Redis-backed [`KvStore`].
pub struct RedisKvStore {
    /// Redis connection pool; `None` when caching is disabled.
    pool: Option<Arc<Pool>>,
    operation_timeout: Duration,
}

impl RedisKvStore {
    /// Creates a store on top of an existing pool.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self {
            pool: Some(pool),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Sets the per-command timeout.
    #[must_use]
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Creates a no-op store (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            pool: None,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> LarderResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                LarderError::Cache(format!("Failed to get Redis connection: {e}"))
            }),
            None => Err(LarderError::cache("Cache is disabled")),
        }
    }

    /// Runs one round trip under the operation timeout.
    async fn bounded<T, F>(&self, operation: &str, fut: F) -> LarderResult<T>
    where
        F: Future<Output = LarderResult<T>> + Send,
    {
        tokio::time::timeout(self.operation_timeout, fut)
            .await
            .map_err(|_| {
                LarderError::Cache(format!(
                    "Redis {operation} timed out after {}ms",
                    self.operation_timeout.as_millis()
                ))
            })?
    }
}

fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl KvStore for RedisKvStore {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get(&self, key: &str) -> LarderResult<Option<Vec<u8>>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        self.bounded("GET", async {
            let mut conn = self.get_conn().await?;
            let value: Option<Vec<u8>> = conn.get(key).await.map_err(|e| {
                LarderError::Cache(format!("Failed to get key '{key}': {e}"))
            })?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> LarderResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let ttl_secs = ttl_secs(ttl);
        self.bounded("SET", async {
            let mut conn = self.get_conn().await?;
            conn.set_ex::<_, _, ()>(key, value, ttl_secs).await.map_err(|e| {
                LarderError::Cache(format!("Failed to set key '{key}': {e}"))
            })?;
            Ok(())
        })
        .await?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> LarderResult<u64> {
        if !self.is_enabled() || keys.is_empty() {
            return Ok(0);
        }

        let deleted = self
            .bounded("DEL", async {
                let mut conn = self.get_conn().await?;
                let deleted: u64 = conn.del(keys).await.map_err(|e| {
                    LarderError::Cache(format!("Failed to delete {} keys: {e}", keys.len()))
                })?;
                Ok(deleted)
            })
            .await?;

        debug!("Deleted {} of {} keys", deleted, keys.len());
        Ok(deleted)
    }

    async fn set_add(&self, key: &str, member: &str, ttl: Duration) -> LarderResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let ttl_secs = i64::try_from(ttl_secs(ttl)).unwrap_or(i64::MAX);
        self.bounded("SADD", async {
            let mut conn = self.get_conn().await?;
            let _: () = deadpool_redis::redis::pipe()
                .atomic()
                .sadd(key, member)
                .ignore()
                .expire(key, ttl_secs)
                .ignore()
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    LarderError::Cache(format!("Failed to add '{member}' to set '{key}': {e}"))
                })?;
            Ok(())
        })
        .await
    }

    async fn set_members(&self, key: &str) -> LarderResult<Vec<String>> {
        if !self.is_enabled() {
            return Ok(Vec::new());
        }

        self.bounded("SMEMBERS", async {
            let mut conn = self.get_conn().await?;
            let members: Vec<String> = conn.smembers(key).await.map_err(|e| {
                LarderError::Cache(format!("Failed to read set '{key}': {e}"))
            })?;
            Ok(members)
        })
        .await
    }

    async fn set_remove(&self, key: &str, members: &[String]) -> LarderResult<u64> {
        if !self.is_enabled() || members.is_empty() {
            return Ok(0);
        }

        self.bounded("SREM", async {
            let mut conn = self.get_conn().await?;
            let removed: u64 = conn.srem(key, members).await.map_err(|e| {
                LarderError::Cache(format!("Failed to remove members from set '{key}': {e}"))
            })?;
            Ok(removed)
        })
        .await
    }

    async fn keys_by_pattern(&self, pattern: &str) -> LarderResult<Vec<String>> {
        if !self.is_enabled() {
            return Ok(Vec::new());
        }

        // SCAN rather than KEYS so a large keyspace never blocks the server.
        // The timeout bounds each round trip, not the whole walk.
        let mut conn = self.bounded("SCAN", self.get_conn()).await?;
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = self
                .bounded("SCAN", async {
                    deadpool_redis::redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn)
                        .await
                        .map_err(|e| {
                            LarderError::Cache(format!("Failed to scan keys '{pattern}': {e}"))
                        })
                })
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once.
        keys.sort_unstable();
        keys.dedup();
        debug!("Found {} keys matching pattern '{}'", keys.len(), pattern);
        Ok(keys)
    }
}

impl std::fmt::Debug for RedisKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKvStore")
            .field("enabled", &self.is_enabled())
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}
