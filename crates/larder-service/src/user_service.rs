//! User service trait definition.

use crate::cache::Cached;
use crate::dto::{
    CreateUserRequest, FlushSummary, ResetSummary, UpdateUserRequest, UserListResponse,
    UserResponse,
};
use async_trait::async_trait;
use larder_core::{Interface, LarderResult, PageRequest, UserId};

/// User service trait.
///
/// Reads go through the cache and report where they were answered from.
/// Writes commit to the store and then invalidate; a cache failure never
/// fails a write.
#[async_trait]
pub trait UserService: Interface + Send + Sync {
    /// Lists one page of users, newest first.
    async fn list_users(&self, page: PageRequest) -> LarderResult<Cached<UserListResponse>>;

    /// Lists every user, newest first.
    async fn list_all_users(&self) -> LarderResult<Cached<Vec<UserResponse>>>;

    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> LarderResult<Cached<UserResponse>>;

    /// Counts all users.
    async fn count_users(&self) -> LarderResult<Cached<u64>>;

    /// Creates a new user.
    async fn create_user(&self, request: CreateUserRequest) -> LarderResult<UserResponse>;

    /// Updates a user's profile.
    async fn update_user(
        &self,
        id: UserId,
        request: UpdateUserRequest,
    ) -> LarderResult<UserResponse>;

    /// Deletes a user.
    async fn delete_user(&self, id: UserId) -> LarderResult<()>;

    /// Inserts the demo users if the store is empty. Returns how many were
    /// inserted.
    async fn seed_users(&self) -> LarderResult<u64>;

    /// Deletes every user, optionally re-seeds, and flushes the user cache.
    async fn reset_users(&self, seed: bool) -> LarderResult<ResetSummary>;

    /// Drops every cached user entry.
    async fn flush_cache(&self) -> FlushSummary;
}
