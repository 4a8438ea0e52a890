//! Read-through accessor.
//!
//! Every read first asks the key-value store. A hit is decoded and returned
//! without touching the database; a miss runs exactly one store query and
//! repopulates the cache on a best-effort basis. Cache failures of any kind
//! degrade to a miss, so the caller only ever sees store errors.

use super::metrics::CacheMetrics;
use super::{BestEffort, CacheKeys, CachePolicy, KvStore, KvStoreExt, PageRegistry};
use larder_core::{Entity, LarderError, LarderResult, PageRequest, Repository, User, UserId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Where a read was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Cache,
    Store,
}

impl Provenance {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Store => "store",
        }
    }

    /// Provenance of a result assembled from two reads: cache only if both were.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Cache, Self::Cache) => Self::Cache,
            _ => Self::Store,
        }
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Cached<T> {
    #[must_use]
    pub const fn from_cache(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Cache,
        }
    }

    #[must_use]
    pub const fn from_store(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Store,
        }
    }

    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.provenance == Provenance::Cache
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cached<U> {
        Cached {
            value: f(self.value),
            provenance: self.provenance,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Which list a list read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    /// Every entity, unpaged.
    All,
    /// One page.
    Page(PageRequest),
}

/// An entity the cache layer can store.
pub trait CacheableEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Display + Send + Sync + 'static;

    /// Kind segment of every cache key for this entity.
    const KIND: &'static str;

    /// Resource name used in not-found errors.
    const RESOURCE: &'static str;

    fn cache_id(&self) -> &Self::Id;
}

impl CacheableEntity for User {
    type Id = UserId;

    const KIND: &'static str = "users";
    const RESOURCE: &'static str = "User";

    fn cache_id(&self) -> &UserId {
        self.id()
    }
}

/// Cache-aside reads for one entity kind over a [`Repository`].
pub struct ReadThroughCache<E, R: ?Sized> {
    store: Arc<dyn KvStore>,
    repository: Arc<R>,
    keys: CacheKeys,
    registry: PageRegistry,
    policy: CachePolicy,
    _entity: PhantomData<fn() -> E>,
}

impl<E, R> ReadThroughCache<E, R>
where
    E: CacheableEntity,
    R: Repository<E, E::Id> + ?Sized,
{
    #[must_use]
    pub fn new(
        store: Arc<dyn KvStore>,
        repository: Arc<R>,
        keys: CacheKeys,
        policy: CachePolicy,
    ) -> Self {
        let registry = PageRegistry::new(Arc::clone(&store), keys.registry(), policy.list_ttl);
        Self {
            store,
            repository,
            keys,
            registry,
            policy,
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    /// Number of entities in the store.
    pub async fn total_count(&self) -> LarderResult<Cached<u64>> {
        let key = self.keys.total();
        if let Some(total) = self.lookup::<u64>(&key, "total").await {
            return Ok(Cached::from_cache(total));
        }

        let total = self.repository.count().await?;
        self.populate(&key, &total, self.policy.list_ttl).await;
        Ok(Cached::from_store(total))
    }

    /// One entity by id. A missing entity is [`LarderError::NotFound`] and is
    /// not cached.
    pub async fn get_by_id(&self, id: &E::Id) -> LarderResult<Cached<E>> {
        let key = self.keys.entity(id);
        if let Some(entity) = self.lookup::<E>(&key, "entity").await {
            return Ok(Cached::from_cache(entity));
        }

        let entity = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| LarderError::not_found(E::RESOURCE, id))?;
        self.populate(&key, &entity, self.policy.entity_ttl).await;
        Ok(Cached::from_store(entity))
    }

    /// The canonical list or one page of it.
    pub async fn list(&self, selector: PageSelector) -> LarderResult<Cached<Vec<E>>> {
        let key = match selector {
            PageSelector::All => self.keys.canonical_list(),
            PageSelector::Page(request) => self.keys.page(request),
        };
        if let Some(items) = self.lookup::<Vec<E>>(&key, "list").await {
            return Ok(Cached::from_cache(items));
        }

        let items = match selector {
            PageSelector::All => self.repository.find_all().await?,
            PageSelector::Page(request) => self.repository.find_page(request).await?,
        };

        // The page is written before it is registered. If the process dies in
        // between, the page stays unregistered until list_ttl expires it.
        if self.populate(&key, &items, self.policy.list_ttl).await
            && self
                .registry
                .register(&key)
                .await
                .best_effort("register", &key)
                .is_none()
        {
            // An unregistered page would survive invalidation.
            self.store
                .delete(std::slice::from_ref(&key))
                .await
                .best_effort("delete", &key);
        }

        Ok(Cached::from_store(items))
    }

    async fn lookup<T>(&self, key: &str, target: &'static str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        match self.store.get_json::<T>(key).await.best_effort("get", key).flatten() {
            Some(value) => {
                debug!("Cache hit for '{}'", key);
                CacheMetrics::hit(E::KIND, target);
                Some(value)
            }
            None => {
                debug!("Cache miss for '{}'", key);
                CacheMetrics::miss(E::KIND, target);
                None
            }
        }
    }

    /// Writes a value, returning whether the write went through.
    async fn populate<T>(&self, key: &str, value: &T, ttl: Duration) -> bool
    where
        T: Serialize + Send + Sync,
    {
        self.store
            .set_json(key, value, ttl)
            .await
            .best_effort("set", key)
            .is_some()
    }
}

impl<E, R: ?Sized> fmt::Debug for ReadThroughCache<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadThroughCache")
            .field("keys", &self.keys)
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .finish()
    }
}
