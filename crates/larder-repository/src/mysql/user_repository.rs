//! MySQL user repository implementation.

use crate::{traits::UserRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use larder_core::{Email, LarderError, LarderResult, PageRequest, Repository, User, UserId};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const SELECT_USERS: &str = "SELECT id, name, username, email, created_at, updated_at FROM users";

// Stable newest-first order; UUIDv7 text breaks created_at ties.
const ORDER_NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

/// MySQL user repository implementation.
#[derive(Clone)]
pub struct MySqlUserRepository {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlUserRepository {
    /// Creates a new MySQL user repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: &UserId) -> LarderResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USERS} WHERE id = ?"))
            .bind(id.into_inner().to_string())
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(User::try_from).transpose()
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: String, // CHAR(36)
    name: String,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = LarderError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| LarderError::Internal(format!("Invalid UUID in database: {e}")))?;

        Ok(User {
            id: UserId::from_uuid(id),
            name: row.name,
            username: row.username,
            email: Email::new_unchecked(row.email),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn rows_to_users(rows: Vec<UserRow>) -> LarderResult<Vec<User>> {
    rows.into_iter().map(User::try_from).collect()
}

#[async_trait]
impl Repository<User, UserId> for MySqlUserRepository {
    async fn find_by_id(&self, id: &UserId) -> LarderResult<Option<User>> {
        debug!("Finding user by id: {}", id);
        self.fetch_by_id(id).await
    }

    async fn find_all(&self) -> LarderResult<Vec<User>> {
        debug!("Finding all users");

        let rows = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USERS} {ORDER_NEWEST_FIRST}"))
            .fetch_all(self.pool.inner())
            .await?;

        rows_to_users(rows)
    }

    async fn find_page(&self, page: PageRequest) -> LarderResult<Vec<User>> {
        debug!("Finding users, page: {}, size: {}", page.page(), page.size());

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USERS} {ORDER_NEWEST_FIRST} LIMIT ? OFFSET ?"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool.inner())
        .await?;

        rows_to_users(rows)
    }

    async fn save(&self, user: &User) -> LarderResult<User> {
        debug!("Saving new user: {}", user.username);

        // MySQL doesn't support RETURNING, so insert then select
        sqlx::query(
            r#"
            INSERT INTO users (id, name, username, email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.into_inner().to_string())
        .bind(&user.name)
        .bind(&user.username)
        .bind(user.email.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool.inner())
        .await?;

        self.fetch_by_id(&user.id)
            .await?
            .ok_or_else(|| LarderError::internal("Failed to fetch inserted user"))
    }

    async fn update(&self, user: &User) -> LarderResult<User> {
        debug!("Updating user: {}", user.id);

        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, username = ?, email = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(user.email.as_str())
        .bind(user.updated_at)
        .bind(user.id.into_inner().to_string())
        .execute(self.pool.inner())
        .await?;

        // MySQL reports 0 affected rows for an unchanged row, so existence is decided by the re-read
        self.fetch_by_id(&user.id)
            .await?
            .ok_or_else(|| LarderError::not_found("User", user.id))
    }

    async fn delete(&self, id: &UserId) -> LarderResult<bool> {
        debug!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.into_inner().to_string())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> LarderResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool.inner())
            .await?;

        u64::try_from(count).map_err(|e| LarderError::internal(format!("Negative row count: {e}")))
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn exists_by_username(&self, username: &str) -> LarderResult<bool> {
        let result: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM users WHERE username = ? LIMIT 1")
                .bind(username)
                .fetch_optional(self.pool.inner())
                .await?;

        Ok(result.is_some())
    }

    async fn exists_by_email(&self, email: &str) -> LarderResult<bool> {
        let result: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM users WHERE LOWER(email) = LOWER(?) LIMIT 1")
                .bind(email)
                .fetch_optional(self.pool.inner())
                .await?;

        Ok(result.is_some())
    }

    async fn delete_all(&self) -> LarderResult<u64> {
        debug!("Deleting all users");

        let result = sqlx::query("DELETE FROM users")
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected())
    }
}

impl std::fmt::Debug for MySqlUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlUserRepository").finish_non_exhaustive()
    }
}
