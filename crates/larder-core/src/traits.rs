//! Core traits shared by the store and cache layers.

use crate::{LarderResult, PageRequest};
use async_trait::async_trait;

/// Base repository trait for the durable store.
///
/// The store is the source of truth. Every list method returns rows in one
/// stable order, newest first, so a page number always denotes the same slice
/// of the table until the table changes.
#[async_trait]
pub trait Repository<T, ID>: Send + Sync
where
    T: Send + Sync,
    ID: Send + Sync,
{
    /// Finds an entity by its ID.
    async fn find_by_id(&self, id: &ID) -> LarderResult<Option<T>>;

    /// Returns every entity.
    async fn find_all(&self) -> LarderResult<Vec<T>>;

    /// Returns one page of entities.
    async fn find_page(&self, page: PageRequest) -> LarderResult<Vec<T>>;

    /// Saves a new entity.
    async fn save(&self, entity: &T) -> LarderResult<T>;

    /// Updates an existing entity.
    async fn update(&self, entity: &T) -> LarderResult<T>;

    /// Deletes an entity by its ID. Returns false if nothing was deleted.
    async fn delete(&self, id: &ID) -> LarderResult<bool>;

    /// Counts all entities.
    async fn count(&self) -> LarderResult<u64>;
}

/// Trait for entities with a unique identifier.
pub trait Entity<ID> {
    /// Returns the entity's unique identifier.
    fn id(&self) -> &ID;
}
