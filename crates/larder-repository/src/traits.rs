//! Repository trait definitions.

use async_trait::async_trait;
use larder_core::{Interface, LarderResult, Repository, User, UserId};

/// User store.
///
/// The generic [`Repository`] operations are what the cache layer reads
/// through; the extra lookups here serve the service's uniqueness checks and
/// the administrative reset.
#[async_trait]
pub trait UserRepository: Repository<User, UserId> + Interface {
    /// Checks if a username is taken.
    async fn exists_by_username(&self, username: &str) -> LarderResult<bool>;

    /// Checks if an email is taken (case-insensitive).
    async fn exists_by_email(&self, email: &str) -> LarderResult<bool>;

    /// Deletes every user. Returns the number of rows removed.
    async fn delete_all(&self) -> LarderResult<u64>;
}
