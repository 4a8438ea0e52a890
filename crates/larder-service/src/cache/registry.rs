//! Page-key registry.

use super::KvStore;
use larder_core::LarderResult;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache-resident set naming every list key currently cached for a kind.
///
/// A list key that is cached is always a member; a member may outlive its
/// page. Invalidation trusts membership as the full list of pages to purge,
/// which avoids scanning the keyspace on every write.
pub struct PageRegistry {
    store: Arc<dyn KvStore>,
    key: String,
    ttl: Duration,
}

impl PageRegistry {
    /// Creates a registry stored at `key`. Each registration resets the
    /// set's lifetime to `ttl`.
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            ttl,
        }
    }

    /// The key of the registry set itself.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Adds a list key.
    pub async fn register(&self, list_key: &str) -> LarderResult<()> {
        self.store.set_add(&self.key, list_key, self.ttl).await
    }

    /// Returns the registered list keys.
    pub async fn members(&self) -> LarderResult<Vec<String>> {
        self.store.set_members(&self.key).await
    }

    /// Unregisters every registered list key and deletes it.
    ///
    /// Members are removed from the set before their pages are deleted, so a
    /// page rebuilt after the delete registers itself again. Only the members
    /// read at the start are removed. If unregistering fails nothing is
    /// deleted; if deleting fails the members are registered again. Either
    /// way the error is returned.
    pub async fn purge(&self) -> LarderResult<u64> {
        let members = self.members().await?;
        if members.is_empty() {
            return Ok(0);
        }

        self.store.set_remove(&self.key, &members).await?;

        let removed = match self.store.delete(&members).await {
            Ok(removed) => removed,
            Err(e) => {
                self.restore(&members).await;
                return Err(e);
            }
        };

        debug!(
            "Purged {} registered pages ({} present) from '{}'",
            members.len(),
            removed,
            self.key
        );
        Ok(removed)
    }

    async fn restore(&self, members: &[String]) {
        for member in members {
            if let Err(e) = self.register(member).await {
                warn!(
                    registry = %self.key,
                    page = %member,
                    error = %e,
                    "Failed to re-register page after a failed purge"
                );
            }
        }
    }
}

impl std::fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRegistry")
            .field("key", &self.key)
            .field("ttl", &self.ttl)
            .finish()
    }
}
