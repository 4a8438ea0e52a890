//! Dependency wiring.
//!
//! Backend handles are created once here and passed down by constructor;
//! nothing in the lower crates reaches for process-wide state.

use deadpool_redis::{Config as RedisPoolConfig, Pool, PoolConfig, Runtime};
use larder_config::{AppConfig, RedisConfig};
use larder_core::{LarderError, LarderResult};
use larder_repository::{
    create_pool, DatabasePool, DatabasePoolInterface, MySqlUserRepository, UserRepository,
};
use larder_service::cache::metrics::register_metrics;
use larder_service::{CachePolicy, KvStore, RedisKvStore, UserService, UserServiceImpl};
use std::sync::Arc;
use tracing::info;

/// Creates the Redis pool, or `None` when caching is disabled.
///
/// deadpool connects lazily, so an unreachable server only shows up as
/// cache errors on first use.
pub fn create_redis_pool(config: &RedisConfig) -> LarderResult<Option<Arc<Pool>>> {
    if !config.enabled {
        info!("Redis disabled, every read goes to the database");
        return Ok(None);
    }

    let mut redis_cfg = RedisPoolConfig::from_url(&config.url);
    redis_cfg.pool = Some(PoolConfig::new(config.pool_size as usize));
    let pool = redis_cfg
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| LarderError::Cache(format!("Failed to create Redis pool: {e}")))?;
    Ok(Some(Arc::new(pool)))
}

/// Wraps the Redis pool in a [`KvStore`].
#[must_use]
pub fn build_kv_store(config: &RedisConfig, pool: Option<Arc<Pool>>) -> Arc<dyn KvStore> {
    match pool {
        Some(pool) => Arc::new(
            RedisKvStore::new(pool).with_operation_timeout(config.operation_timeout()),
        ),
        None => Arc::new(RedisKvStore::disabled()),
    }
}

/// Everything a command needs, built from configuration.
pub struct AppContext {
    database: Arc<DatabasePool>,
    redis: Option<Arc<Pool>>,
    user_service: Arc<dyn UserService>,
}

impl AppContext {
    /// Connects to the database, applies migrations if configured, and wires
    /// the user service over the cache.
    pub async fn build(config: &AppConfig) -> LarderResult<Self> {
        register_metrics();

        let database = create_pool(&config.database).await?;
        let redis = create_redis_pool(&config.redis)?;
        let store = build_kv_store(&config.redis, redis.clone());

        let user_repository: Arc<dyn UserRepository> =
            Arc::new(MySqlUserRepository::new(database.clone()));
        let user_service: Arc<dyn UserService> = Arc::new(UserServiceImpl::new(
            user_repository,
            store,
            &config.cache.namespace,
            CachePolicy::from(&config.cache),
        ));

        Ok(Self {
            database,
            redis,
            user_service,
        })
    }

    /// Closes both pools.
    pub async fn shutdown(&self) {
        if let Some(redis) = &self.redis {
            info!("Closing Redis connection pool...");
            redis.close();
        }
        self.database.close().await;
    }
}

/// Resolves the service layer.
pub trait ServiceResolver {
    fn user_service(&self) -> Arc<dyn UserService>;
}

impl ServiceResolver for AppContext {
    fn user_service(&self) -> Arc<dyn UserService> {
        Arc::clone(&self.user_service)
    }
}

/// Resolves the database pool.
pub trait DatabaseResolver {
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface>;
}

impl DatabaseResolver for AppContext {
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface> {
        self.database.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_redis_has_no_pool() {
        let config = RedisConfig {
            enabled: false,
            ..RedisConfig::default()
        };
        assert!(create_redis_pool(&config).unwrap().is_none());
        assert!(!build_kv_store(&config, None).is_enabled());
    }

    #[tokio::test]
    async fn test_enabled_redis_pool_is_lazy() {
        let config = RedisConfig {
            url: "redis://127.0.0.1:1".to_string(),
            enabled: true,
            ..RedisConfig::default()
        };
        let pool = create_redis_pool(&config).unwrap();
        assert!(pool.is_some());
        assert!(build_kv_store(&config, pool).is_enabled());
    }

    #[test]
    fn test_resolver_bounds() {
        fn _assert_service_resolver<T: ServiceResolver>() {}
        fn _assert_database_resolver<T: DatabaseResolver>() {}

        _assert_service_resolver::<AppContext>();
        _assert_database_resolver::<AppContext>();
    }
}
