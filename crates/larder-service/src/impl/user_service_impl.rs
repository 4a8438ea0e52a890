//! User service implementations.

use crate::cache::{
    CacheKeys, CachePolicy, Cached, CacheableEntity, InvalidationCoordinator, KvStore,
    PageSelector, ReadThroughCache,
};
use crate::dto::{
    CreateUserRequest, FlushSummary, ResetSummary, UpdateUserRequest, UserListResponse,
    UserResponse,
};
use crate::mappers::to_page;
use crate::seed::demo_users;
use crate::user_service::UserService;
use async_trait::async_trait;
use larder_core::{
    Email, LarderError, LarderResult, PageRequest, User, UserId, ValidateExt,
};
use larder_repository::UserRepository;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// User service over a [`UserRepository`] with a cache in front of it.
pub struct UserServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    cache: ReadThroughCache<User, dyn UserRepository>,
    invalidation: InvalidationCoordinator<User>,
}

impl UserServiceImpl {
    /// Creates a new user service.
    ///
    /// `namespace` prefixes every cache key this service reads or writes.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        store: Arc<dyn KvStore>,
        namespace: &str,
        policy: CachePolicy,
    ) -> Self {
        let keys = CacheKeys::new(namespace, User::KIND);
        Self {
            cache: ReadThroughCache::new(
                Arc::clone(&store),
                Arc::clone(&user_repository),
                keys.clone(),
                policy,
            ),
            invalidation: InvalidationCoordinator::new(store, keys, policy),
            user_repository,
        }
    }

    async fn ensure_username_free(&self, username: &str) -> LarderResult<()> {
        if self.user_repository.exists_by_username(username).await? {
            return Err(LarderError::Conflict(format!(
                "Username '{username}' already exists"
            )));
        }
        Ok(())
    }

    async fn ensure_email_free(&self, email: &Email) -> LarderResult<()> {
        if self.user_repository.exists_by_email(email.as_str()).await? {
            return Err(LarderError::Conflict(format!(
                "Email '{email}' already exists"
            )));
        }
        Ok(())
    }

    async fn insert_demo_users(&self) -> LarderResult<u64> {
        let mut inserted = 0;
        for user in demo_users() {
            self.user_repository.save(&user).await?;
            inserted += 1;
        }
        Ok(inserted)
    }
}

fn parse_email(raw: &str) -> LarderResult<Email> {
    Email::new(raw).map_err(|e| LarderError::Validation(e.to_string()))
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn list_users(&self, page: PageRequest) -> LarderResult<Cached<UserListResponse>> {
        let users = self.cache.list(PageSelector::Page(page)).await?;
        let total = self.cache.total_count().await?;
        let provenance = users.provenance.combine(total.provenance);

        let response = UserListResponse::from(to_page(users.value, page, total.value));
        Ok(Cached {
            value: response,
            provenance,
        })
    }

    async fn list_all_users(&self) -> LarderResult<Cached<Vec<UserResponse>>> {
        let users = self.cache.list(PageSelector::All).await?;
        Ok(users.map(|users| users.into_iter().map(UserResponse::from).collect()))
    }

    async fn get_user(&self, id: UserId) -> LarderResult<Cached<UserResponse>> {
        let user = self.cache.get_by_id(&id).await?;
        Ok(user.map(UserResponse::from))
    }

    async fn count_users(&self) -> LarderResult<Cached<u64>> {
        self.cache.total_count().await
    }

    async fn create_user(&self, request: CreateUserRequest) -> LarderResult<UserResponse> {
        debug!("Creating user: {}", request.username);

        request.validate_request()?;
        let email = parse_email(&request.email)?;

        self.ensure_username_free(&request.username).await?;
        self.ensure_email_free(&email).await?;

        let user = User::new(request.name, request.username, email);
        let saved_user = self.user_repository.save(&user).await?;
        self.invalidation.on_create(&saved_user).await;

        info!("User created: {}", saved_user.id);
        Ok(UserResponse::from(saved_user))
    }

    async fn update_user(
        &self,
        id: UserId,
        request: UpdateUserRequest,
    ) -> LarderResult<UserResponse> {
        debug!("Updating user: {}", id);

        request.validate_request()?;

        // Read the row from the store, never from the cache, so the write
        // starts from committed state.
        let mut user = self
            .user_repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| LarderError::not_found("User", id))?;

        let email = request.email.as_deref().map(parse_email).transpose()?;

        if let Some(username) = request.username.as_deref().filter(|u| *u != user.username) {
            self.ensure_username_free(username).await?;
        }
        if let Some(email) = email.as_ref().filter(|e| **e != user.email) {
            self.ensure_email_free(email).await?;
        }

        if !user.apply_changes(request.name, request.username, email) {
            debug!("User {} unchanged", id);
            return Ok(UserResponse::from(user));
        }

        let updated_user = self.user_repository.update(&user).await?;
        self.invalidation.on_update(&updated_user).await;

        info!("User updated: {}", id);
        Ok(UserResponse::from(updated_user))
    }

    async fn delete_user(&self, id: UserId) -> LarderResult<()> {
        debug!("Deleting user: {}", id);

        if !self.user_repository.delete(&id).await? {
            return Err(LarderError::not_found("User", id));
        }
        self.invalidation.on_delete(&id).await;

        info!("User deleted: {}", id);
        Ok(())
    }

    async fn seed_users(&self) -> LarderResult<u64> {
        if self.user_repository.count().await? > 0 {
            debug!("Users present, skipping seed");
            return Ok(0);
        }

        let seeded = self.insert_demo_users().await?;
        self.invalidation.invalidate_everything().await;

        info!("Seeded {} users", seeded);
        Ok(seeded)
    }

    async fn reset_users(&self, seed: bool) -> LarderResult<ResetSummary> {
        let deleted = self.user_repository.delete_all().await?;
        let seeded = if seed { self.insert_demo_users().await? } else { 0 };
        let report = self.invalidation.invalidate_everything().await;
        if !report.is_complete() {
            warn!(
                failures = report.failures.len(),
                "Cache flush after reset was incomplete; stale entries expire with their TTL"
            );
        }

        info!("Reset users: {} deleted, {} seeded", deleted, seeded);
        Ok(ResetSummary {
            deleted,
            seeded,
            cache_keys_removed: report.keys_removed,
        })
    }

    async fn flush_cache(&self) -> FlushSummary {
        let report = self.invalidation.invalidate_everything().await;
        info!("Flushed {} cached user keys", report.keys_removed);
        FlushSummary {
            mutation: report.mutation,
            cache_keys_removed: report.keys_removed,
            failures: report.failures,
        }
    }
}
