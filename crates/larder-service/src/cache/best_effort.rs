//! Absorbing cache failures.

use super::metrics::CacheMetrics;
use larder_core::LarderResult;
use tracing::warn;

/// Turns a cache call result into an optional value, logging the failure.
///
/// Cache trouble must never fail a request, so read and write paths call
/// this on every [`KvStore`](super::KvStore) result.
pub trait BestEffort<T> {
    fn best_effort(self, operation: &'static str, key: &str) -> Option<T>;
}

impl<T> BestEffort<T> for LarderResult<T> {
    fn best_effort(self, operation: &'static str, key: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(operation, key, error = %e, "Cache operation failed, continuing without cache");
                CacheMetrics::backend_error(operation);
                None
            }
        }
    }
}
