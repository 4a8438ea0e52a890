//! Cache key generators for consistent key naming.

use larder_core::PageRequest;
use std::fmt::Display;

/// Key scheme for one entity kind inside one namespace.
///
/// Every key starts with `<namespace>:<kind>:`, so kinds never collide and
/// a namespace can be shared by several processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    #[must_use]
    pub fn new(namespace: &str, kind: &str) -> Self {
        Self {
            prefix: format!("{namespace}:{kind}"),
        }
    }

    /// Key of a single entity.
    #[must_use]
    pub fn entity(&self, id: &impl Display) -> String {
        format!("{}:id:{}", self.prefix, id)
    }

    /// Key of one list page. Page number and size are both part of the key.
    #[must_use]
    pub fn page(&self, request: PageRequest) -> String {
        format!(
            "{}:list:page:{}:size:{}",
            self.prefix, request.page(), request.size()
        )
    }

    /// Key of the unpaged list.
    #[must_use]
    pub fn canonical_list(&self) -> String {
        format!("{}:list", self.prefix)
    }

    /// Key of the row count.
    #[must_use]
    pub fn total(&self) -> String {
        format!("{}:total", self.prefix)
    }

    /// Key of the set that tracks every cached list key.
    #[must_use]
    pub fn registry(&self) -> String {
        format!("{}:list:keys", self.prefix)
    }

    /// Glob matching every single-entity key.
    #[must_use]
    pub fn entity_pattern(&self) -> String {
        format!("{}:id:*", self.prefix)
    }

    /// Returns true for list keys (canonical or paged), false for the registry.
    #[must_use]
    pub fn is_list_key(&self, key: &str) -> bool {
        let Some(rest) = key
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix(":list"))
        else {
            return false;
        };
        rest.is_empty() || rest.starts_with(":page:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::UserId;

    fn keys() -> CacheKeys {
        CacheKeys::new("larder", "users")
    }

    #[test]
    fn test_entity_key() {
        let id = UserId::new();
        assert_eq!(keys().entity(&id), format!("larder:users:id:{id}"));
    }

    #[test]
    fn test_page_key_includes_page_and_size() {
        let keys = keys();
        assert_eq!(
            keys.page(PageRequest::new(2, 10)),
            "larder:users:list:page:2:size:10"
        );
        assert_ne!(
            keys.page(PageRequest::new(1, 10)),
            keys.page(PageRequest::new(1, 20))
        );
    }

    #[test]
    fn test_fixed_keys() {
        let keys = keys();
        assert_eq!(keys.canonical_list(), "larder:users:list");
        assert_eq!(keys.total(), "larder:users:total");
        assert_eq!(keys.registry(), "larder:users:list:keys");
        assert_eq!(keys.entity_pattern(), "larder:users:id:*");
    }

    #[test]
    fn test_kinds_are_disjoint() {
        let users = CacheKeys::new("larder", "users");
        let teams = CacheKeys::new("larder", "teams");
        assert_ne!(users.total(), teams.total());
        assert!(!users.is_list_key(&teams.canonical_list()));
    }

    #[test]
    fn test_is_list_key() {
        let keys = keys();
        assert!(keys.is_list_key(&keys.canonical_list()));
        assert!(keys.is_list_key(&keys.page(PageRequest::first())));
        assert!(!keys.is_list_key(&keys.registry()));
        assert!(!keys.is_list_key(&keys.total()));
        assert!(!keys.is_list_key("larder:users:listing"));
    }
}
