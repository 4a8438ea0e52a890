//! Hand-written test doubles.

use crate::cache::{InMemoryKvStore, KvStore};
use async_trait::async_trait;
use larder_core::{
    Email, LarderError, LarderResult, PageRequest, Repository, User, UserId,
};
use larder_repository::UserRepository;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory user store that counts the queries it serves.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
    queries: AtomicUsize,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let repo = Self::new();
        repo.users
            .lock()
            .extend(users.into_iter().map(|u| (u.id, u)));
        repo
    }

    /// Store reads served so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn reset_queries(&self) {
        self.queries.store(0, Ordering::SeqCst);
    }

    /// Writes a row behind the cache's back.
    pub fn put(&self, user: User) {
        self.users.lock().insert(user.id, user);
    }

    fn read(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }

    fn sorted(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.lock().values().cloned().collect();
        users.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        users
    }
}

#[async_trait]
impl Repository<User, UserId> for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> LarderResult<Option<User>> {
        self.read();
        Ok(self.users.lock().get(id).cloned())
    }

    async fn find_all(&self) -> LarderResult<Vec<User>> {
        self.read();
        Ok(self.sorted())
    }

    async fn find_page(&self, page: PageRequest) -> LarderResult<Vec<User>> {
        self.read();
        Ok(self
            .sorted()
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn save(&self, entity: &User) -> LarderResult<User> {
        let mut users = self.users.lock();
        let clash = users.values().any(|u| {
            u.username == entity.username || u.email == entity.email
        });
        if clash {
            return Err(LarderError::conflict("Duplicate username or email"));
        }
        users.insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn update(&self, entity: &User) -> LarderResult<User> {
        let mut users = self.users.lock();
        if !users.contains_key(&entity.id) {
            return Err(LarderError::not_found("User", entity.id));
        }
        users.insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn delete(&self, id: &UserId) -> LarderResult<bool> {
        Ok(self.users.lock().remove(id).is_some())
    }

    async fn count(&self) -> LarderResult<u64> {
        self.read();
        Ok(self.users.lock().len() as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn exists_by_username(&self, username: &str) -> LarderResult<bool> {
        Ok(self.users.lock().values().any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> LarderResult<bool> {
        let email = email.to_lowercase();
        Ok(self.users.lock().values().any(|u| u.email.as_str() == email))
    }

    async fn delete_all(&self) -> LarderResult<u64> {
        let mut users = self.users.lock();
        let removed = users.len() as u64;
        users.clear();
        Ok(removed)
    }
}

/// [`InMemoryKvStore`] with switches that make individual operations fail.
#[derive(Default)]
pub struct FailingKvStore {
    inner: InMemoryKvStore,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_delete: AtomicBool,
    fail_set_add: AtomicBool,
    fail_set_remove: AtomicBool,
    /// `(registry, page)` to cache and register once the next delete lands.
    rebuild_after_delete: Mutex<Option<(String, String)>>,
}

impl FailingKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &InMemoryKvStore {
        &self.inner
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set_add(&self, fail: bool) {
        self.fail_set_add.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set_remove(&self, fail: bool) {
        self.fail_set_remove.store(fail, Ordering::SeqCst);
    }

    /// After the next successful delete, caches `page` again and adds it to
    /// `registry`, as a reader repopulating the page would.
    pub fn rebuild_after_next_delete(&self, registry: &str, page: &str) {
        *self.rebuild_after_delete.lock() = Some((registry.to_string(), page.to_string()));
    }

    /// Makes every operation fail, like an unreachable server.
    pub fn fail_all(&self, fail: bool) {
        self.fail_get(fail);
        self.fail_set(fail);
        self.fail_delete(fail);
        self.fail_set_add(fail);
        self.fail_set_remove(fail);
    }

    fn check(flag: &AtomicBool, op: &str) -> LarderResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(LarderError::cache(format!("{op} failed: connection refused")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KvStore for FailingKvStore {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> LarderResult<Option<Vec<u8>>> {
        Self::check(&self.fail_get, "GET")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> LarderResult<()> {
        Self::check(&self.fail_set, "SET")?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, keys: &[String]) -> LarderResult<u64> {
        Self::check(&self.fail_delete, "DEL")?;
        let deleted = self.inner.delete(keys).await?;

        let rebuild = self.rebuild_after_delete.lock().take();
        if let Some((registry, page)) = rebuild {
            let ttl = Duration::from_secs(300);
            self.inner.set(&page, b"[]", ttl).await?;
            self.inner.set_add(&registry, &page, ttl).await?;
        }
        Ok(deleted)
    }

    async fn set_add(&self, key: &str, member: &str, ttl: Duration) -> LarderResult<()> {
        Self::check(&self.fail_set_add, "SADD")?;
        self.inner.set_add(key, member, ttl).await
    }

    async fn set_members(&self, key: &str) -> LarderResult<Vec<String>> {
        Self::check(&self.fail_get, "SMEMBERS")?;
        self.inner.set_members(key).await
    }

    async fn set_remove(&self, key: &str, members: &[String]) -> LarderResult<u64> {
        Self::check(&self.fail_set_remove, "SREM")?;
        self.inner.set_remove(key, members).await
    }

    async fn keys_by_pattern(&self, pattern: &str) -> LarderResult<Vec<String>> {
        Self::check(&self.fail_get, "SCAN")?;
        self.inner.keys_by_pattern(pattern).await
    }
}

/// Users with strictly increasing creation times, oldest first.
pub fn user_sequence(count: usize) -> Vec<User> {
    (0..count)
        .map(|i| {
            let mut user = User::new(
                format!("User {i}"),
                format!("user{i}"),
                Email::new_unchecked(format!("user{i}@example.com")),
            );
            user.created_at -= chrono::Duration::seconds((count - i) as i64);
            user.updated_at = user.created_at;
            user
        })
        .collect()
}
