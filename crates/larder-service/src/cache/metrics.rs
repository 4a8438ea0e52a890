//! Cache metrics.
//!
//! Counters go through the `metrics` facade; nothing is exported unless the
//! host process installs a recorder.

use metrics::{counter, describe_counter};

/// Metric names for the cache layer.
pub mod names {
    /// Reads answered from the cache.
    pub const CACHE_HITS_TOTAL: &str = "larder_cache_hits_total";
    /// Reads that fell through to the store.
    pub const CACHE_MISSES_TOTAL: &str = "larder_cache_misses_total";
    /// Cache backend failures that were absorbed.
    pub const CACHE_BACKEND_ERRORS_TOTAL: &str = "larder_cache_backend_errors_total";
    /// Keys removed by invalidation.
    pub const CACHE_INVALIDATED_KEYS_TOTAL: &str = "larder_cache_invalidated_keys_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::CACHE_HITS_TOTAL,
        "Total number of reads served from the cache"
    );
    describe_counter!(
        names::CACHE_MISSES_TOTAL,
        "Total number of reads that went to the store"
    );
    describe_counter!(
        names::CACHE_BACKEND_ERRORS_TOTAL,
        "Total number of cache backend errors absorbed by the cache layer"
    );
    describe_counter!(
        names::CACHE_INVALIDATED_KEYS_TOTAL,
        "Total number of cache keys removed by invalidation"
    );
}

/// Cache metrics recorder.
#[derive(Clone)]
pub struct CacheMetrics;

impl CacheMetrics {
    /// Record a cache hit.
    pub fn hit(kind: &str, target: &'static str) {
        counter!(
            names::CACHE_HITS_TOTAL,
            "kind" => kind.to_string(),
            "target" => target
        )
        .increment(1);
    }

    /// Record a cache miss.
    pub fn miss(kind: &str, target: &'static str) {
        counter!(
            names::CACHE_MISSES_TOTAL,
            "kind" => kind.to_string(),
            "target" => target
        )
        .increment(1);
    }

    /// Record an absorbed backend error.
    pub fn backend_error(operation: &'static str) {
        counter!(
            names::CACHE_BACKEND_ERRORS_TOTAL,
            "operation" => operation
        )
        .increment(1);
    }

    /// Record keys removed by an invalidation.
    pub fn invalidated(kind: &str, mutation: &'static str, keys: u64) {
        counter!(
            names::CACHE_INVALIDATED_KEYS_TOTAL,
            "kind" => kind.to_string(),
            "mutation" => mutation
        )
        .increment(keys);
    }
}
