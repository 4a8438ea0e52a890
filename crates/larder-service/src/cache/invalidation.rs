//! Write-side invalidation.
//!
//! After a store write commits, the coordinator removes every cache entry the
//! write made stale. Failures are collected into the returned report and
//! logged; they are never surfaced to the writer, because the write itself
//! already succeeded.

use super::metrics::CacheMetrics;
use super::{CacheKeys, CachePolicy, CacheableEntity, KvStore, PageRegistry};
use larder_core::LarderError;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// The kind of write that triggered an invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutation {
    Create,
    Update,
    Delete,
    /// Administrative flush of many entities at once.
    Bulk,
}

impl Mutation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Bulk => "bulk",
        }
    }
}

/// Outcome of one invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationReport {
    pub mutation: Mutation,
    /// Keys that existed and were deleted.
    pub keys_removed: u64,
    /// One message per failed step.
    pub failures: Vec<String>,
}

impl InvalidationReport {
    fn new(mutation: Mutation) -> Self {
        Self {
            mutation,
            keys_removed: 0,
            failures: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, step: &str, result: Result<u64, LarderError>) {
        match result {
            Ok(removed) => self.keys_removed += removed,
            Err(e) => {
                warn!(mutation = self.mutation.as_str(), step, error = %e, "Cache invalidation step failed");
                self.failures.push(format!("{step}: {e}"));
            }
        }
    }
}

/// Removes stale cache entries for one entity kind.
///
/// | mutation | entity key | total | list pages |
/// |----------|------------|-------|------------|
/// | create   |            |   x   |     x      |
/// | update   |     x      |       |     x      |
/// | delete   |     x      |   x   |     x      |
///
/// Every operation is idempotent.
pub struct InvalidationCoordinator<E> {
    store: Arc<dyn KvStore>,
    keys: CacheKeys,
    registry: PageRegistry,
    _entity: PhantomData<fn() -> E>,
}

impl<E: CacheableEntity> InvalidationCoordinator<E> {
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, keys: CacheKeys, policy: CachePolicy) -> Self {
        let registry = PageRegistry::new(Arc::clone(&store), keys.registry(), policy.list_ttl);
        Self {
            store,
            keys,
            registry,
            _entity: PhantomData,
        }
    }

    /// A new entity changes the count and shifts every page.
    pub async fn on_create(&self, entity: &E) -> InvalidationReport {
        debug!("Invalidating after create of {} {}", E::KIND, entity.cache_id());
        let mut report = InvalidationReport::new(Mutation::Create);
        self.delete_keys(&mut report, vec![self.keys.total()]).await;
        self.purge_pages(&mut report).await;
        self.finish(report)
    }

    /// An edit changes the entity and any page that shows it. The count
    /// stays valid.
    pub async fn on_update(&self, entity: &E) -> InvalidationReport {
        let id = entity.cache_id();
        debug!("Invalidating after update of {} {}", E::KIND, id);
        let mut report = InvalidationReport::new(Mutation::Update);
        self.delete_keys(&mut report, vec![self.keys.entity(id)]).await;
        self.purge_pages(&mut report).await;
        self.finish(report)
    }

    /// A removal invalidates the entity, the count and every page.
    pub async fn on_delete(&self, id: &E::Id) -> InvalidationReport {
        debug!("Invalidating after delete of {} {}", E::KIND, id);
        let mut report = InvalidationReport::new(Mutation::Delete);
        self.delete_keys(&mut report, vec![self.keys.entity(id), self.keys.total()])
            .await;
        self.purge_pages(&mut report).await;
        self.finish(report)
    }

    /// Deletes every cached single entity of this kind.
    pub async fn invalidate_all_entities(&self) -> InvalidationReport {
        let mut report = InvalidationReport::new(Mutation::Bulk);
        self.delete_entities(&mut report).await;
        self.finish(report)
    }

    /// Deletes every entry of this kind: entities, count and list pages.
    pub async fn invalidate_everything(&self) -> InvalidationReport {
        let mut report = InvalidationReport::new(Mutation::Bulk);
        self.delete_entities(&mut report).await;
        self.delete_keys(&mut report, vec![self.keys.total()]).await;
        self.purge_pages(&mut report).await;
        self.finish(report)
    }

    async fn delete_keys(&self, report: &mut InvalidationReport, keys: Vec<String>) {
        let result = self.store.delete(&keys).await;
        report.record("delete", result);
    }

    async fn purge_pages(&self, report: &mut InvalidationReport) {
        let result = self.registry.purge().await;
        report.record("purge pages", result);
    }

    async fn delete_entities(&self, report: &mut InvalidationReport) {
        let pattern = self.keys.entity_pattern();
        match self.store.keys_by_pattern(&pattern).await {
            Ok(keys) if keys.is_empty() => {}
            Ok(keys) => self.delete_keys(report, keys).await,
            Err(e) => report.record("scan entities", Err(e)),
        }
    }

    fn finish(&self, report: InvalidationReport) -> InvalidationReport {
        CacheMetrics::invalidated(E::KIND, report.mutation.as_str(), report.keys_removed);
        debug!(
            "Invalidation ({}) of {} removed {} keys with {} failures",
            report.mutation.as_str(),
            E::KIND,
            report.keys_removed,
            report.failures.len()
        );
        report
    }
}

impl<E> std::fmt::Debug for InvalidationCoordinator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationCoordinator")
            .field("keys", &self.keys)
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{InMemoryKvStore, KvStoreExt};
    use crate::testing::{user_sequence, FailingKvStore};
    use larder_core::{PageRequest, User};
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(300);

    fn keys() -> CacheKeys {
        CacheKeys::new("test", User::KIND)
    }

    /// Fills the cache the way reads would: two entities, the total and two
    /// registered pages.
    async fn warm(store: &dyn KvStore, users: &[User]) {
        let keys = keys();
        for user in users {
            store.set_json(&keys.entity(&user.id), user, TTL).await.unwrap();
        }
        store.set_json(&keys.total(), &(users.len() as u64), TTL).await.unwrap();
        for page in [keys.canonical_list(), keys.page(PageRequest::first())] {
            store.set_json(&page, &users, TTL).await.unwrap();
            store.set_add(&keys.registry(), &page, TTL).await.unwrap();
        }
    }

    fn setup() -> (Arc<InMemoryKvStore>, InvalidationCoordinator<User>) {
        let store = Arc::new(InMemoryKvStore::new());
        let coordinator = InvalidationCoordinator::new(store.clone(), keys(), CachePolicy::default());
        (store, coordinator)
    }

    #[tokio::test]
    async fn test_on_create_keeps_entities() {
        let users = user_sequence(2);
        let (store, coordinator) = setup();
        warm(store.as_ref(), &users).await;

        let report = coordinator.on_create(&users[0]).await;

        assert_eq!(report.mutation, Mutation::Create);
        assert_eq!(report.keys_removed, 3);
        assert!(report.is_complete());
        let mut expected = vec![keys().entity(&users[0].id), keys().entity(&users[1].id)];
        expected.sort();
        assert_eq!(store.keys(), expected);
    }

    #[tokio::test]
    async fn test_on_update_keeps_total_and_other_entities() {
        let users = user_sequence(2);
        let (store, coordinator) = setup();
        warm(store.as_ref(), &users).await;

        let report = coordinator.on_update(&users[0]).await;

        assert_eq!(report.keys_removed, 3);
        assert!(!store.contains_key(&keys().entity(&users[0].id)));
        assert!(store.contains_key(&keys().entity(&users[1].id)));
        assert!(store.contains_key(&keys().total()));
        assert!(!store.contains_key(&keys().registry()));
    }

    #[tokio::test]
    async fn test_on_delete_removes_entity_total_and_pages() {
        let users = user_sequence(2);
        let (store, coordinator) = setup();
        warm(store.as_ref(), &users).await;

        let report = coordinator.on_delete(&users[1].id).await;

        assert_eq!(report.keys_removed, 4);
        assert_eq!(store.keys(), vec![keys().entity(&users[0].id)]);
    }

    #[tokio::test]
    async fn test_invalidation_is_idempotent() {
        let users = user_sequence(2);
        let (store, coordinator) = setup();
        warm(store.as_ref(), &users).await;

        coordinator.on_delete(&users[0].id).await;
        let after_once = store.keys();

        let second = coordinator.on_delete(&users[0].id).await;
        assert!(second.is_complete());
        assert_eq!(second.keys_removed, 0);
        assert_eq!(store.keys(), after_once);
    }

    #[tokio::test]
    async fn test_invalidate_all_entities_leaves_lists() {
        let users = user_sequence(3);
        let (store, coordinator) = setup();
        warm(store.as_ref(), &users).await;

        let report = coordinator.invalidate_all_entities().await;

        assert_eq!(report.mutation, Mutation::Bulk);
        assert_eq!(report.keys_removed, 3);
        assert!(store.keys_by_pattern(&keys().entity_pattern()).await.unwrap().is_empty());
        assert!(store.contains_key(&keys().total()));
        assert!(store.contains_key(&keys().canonical_list()));
    }

    #[tokio::test]
    async fn test_invalidate_everything_empties_kind() {
        let users = user_sequence(3);
        let (store, coordinator) = setup();
        warm(store.as_ref(), &users).await;
        store.set("other:users:total", b"1", TTL).await.unwrap();

        let report = coordinator.invalidate_everything().await;

        assert_eq!(report.keys_removed, 6);
        assert_eq!(store.keys(), vec!["other:users:total"]);
    }

    #[tokio::test]
    async fn test_failures_are_reported_not_raised() {
        let users = user_sequence(1);
        let store = Arc::new(FailingKvStore::new());
        let coordinator: InvalidationCoordinator<User> =
            InvalidationCoordinator::new(store.clone(), keys(), CachePolicy::default());
        warm(store.as_ref(), &users).await;
        store.fail_delete(true);

        let report = coordinator.on_delete(&users[0].id).await;
        assert_eq!(report.keys_removed, 0);
        assert_eq!(report.failures.len(), 2);

        // Pages are still registered, so a later invalidation finds them.
        store.fail_delete(false);
        let retry = coordinator.on_delete(&users[0].id).await;
        assert!(retry.is_complete());
        assert!(store.inner().keys().is_empty());
    }
}
