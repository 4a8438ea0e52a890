//! Key-value store contract used by the cache layer.

use async_trait::async_trait;
use larder_core::{Interface, LarderResult};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Key-value backend with TTL support and string sets.
///
/// Every method reports backend trouble as [`larder_core::LarderError::Cache`].
/// Deleting or removing something that is not there succeeds.
#[async_trait]
pub trait KvStore: Interface {
    /// Returns false when caching is switched off and every call is a no-op.
    fn is_enabled(&self) -> bool;

    /// Returns the stored bytes, or `None` for an absent or expired key.
    async fn get(&self, key: &str) -> LarderResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value, for `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> LarderResult<()>;

    /// Deletes `keys`. Returns how many existed.
    async fn delete(&self, keys: &[String]) -> LarderResult<u64>;

    /// Adds `member` to the set at `key` and resets the set's lifetime to `ttl`.
    async fn set_add(&self, key: &str, member: &str, ttl: Duration) -> LarderResult<()>;

    /// Returns the members of the set at `key` (empty when absent).
    async fn set_members(&self, key: &str) -> LarderResult<Vec<String>>;

    /// Removes `members` from the set at `key`. Returns how many were present.
    ///
    /// A set left empty disappears.
    async fn set_remove(&self, key: &str, members: &[String]) -> LarderResult<u64>;

    /// Returns every key matching a glob pattern. Only a trailing `*` is
    /// guaranteed to be understood by every backend.
    async fn keys_by_pattern(&self, pattern: &str) -> LarderResult<Vec<String>>;
}

/// Typed JSON helpers on top of [`KvStore`].
#[async_trait]
pub trait KvStoreExt: KvStore {
    /// Reads and decodes a JSON value.
    ///
    /// A payload that does not decode is reported as
    /// [`larder_core::LarderError::Serialization`].
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> LarderResult<Option<T>> {
        match self.get(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Encodes `value` as JSON and stores it for `ttl`.
    async fn set_json<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> LarderResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, &bytes, ttl).await
    }
}

impl<T: KvStore + ?Sized> KvStoreExt for T {}
