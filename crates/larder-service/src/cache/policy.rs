//! TTL policy.

use larder_config::CacheConfig;
use std::time::Duration;

/// Default lifetime of list pages and the total count.
pub const DEFAULT_LIST_TTL: Duration = Duration::from_secs(300);

/// Default lifetime of single-entity entries.
pub const DEFAULT_ENTITY_TTL: Duration = Duration::from_secs(600);

/// How long each class of cache entry lives.
///
/// The page registry uses `list_ttl`, so it never outlives the pages it
/// tracks by more than one list lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub list_ttl: Duration,
    pub entity_ttl: Duration,
}

impl CachePolicy {
    #[must_use]
    pub const fn new(list_ttl: Duration, entity_ttl: Duration) -> Self {
        Self {
            list_ttl,
            entity_ttl,
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LIST_TTL, DEFAULT_ENTITY_TTL)
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self::new(config.list_ttl(), config.entity_ttl())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = CachePolicy::default();
        assert_eq!(policy.list_ttl, Duration::from_secs(300));
        assert_eq!(policy.entity_ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_policy_from_config() {
        let config = CacheConfig {
            list_ttl_secs: 30,
            entity_ttl_secs: 90,
            ..CacheConfig::default()
        };
        let policy = CachePolicy::from(&config);
        assert_eq!(policy.list_ttl, Duration::from_secs(30));
        assert_eq!(policy.entity_ttl, Duration::from_secs(90));
    }
}
