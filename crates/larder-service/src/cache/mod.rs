//! Caching infrastructure for the service layer.
//!
//! [`KvStore`] is the narrow contract the cache needs from a key-value
//! backend. [`RedisKvStore`] talks to Redis through a deadpool connection
//! pool; [`InMemoryKvStore`] keeps everything in process.
//!
//! Key layout (`<ns>` is the configured namespace, `<kind>` the entity kind):
//!
//! ```text
//! <ns>:<kind>:id:<id>                      single entity     entity TTL
//! <ns>:<kind>:list                         whole list        list TTL
//! <ns>:<kind>:list:page:<page>:size:<n>    one list page     list TTL
//! <ns>:<kind>:total                        row count         list TTL
//! <ns>:<kind>:list:keys                    page registry     list TTL, refreshed on add
//! ```

mod best_effort;
mod cache_keys;
mod invalidation;
mod kv_store;
mod memory_cache;
pub mod metrics;
mod policy;
mod read_through;
mod redis_cache;
mod registry;

pub use best_effort::BestEffort;
pub use cache_keys::CacheKeys;
pub use invalidation::{InvalidationCoordinator, InvalidationReport, Mutation};
pub use kv_store::{KvStore, KvStoreExt};
pub use memory_cache::InMemoryKvStore;
pub use policy::CachePolicy;
pub use read_through::{Cached, CacheableEntity, PageSelector, Provenance, ReadThroughCache};
pub use redis_cache::RedisKvStore;
pub use registry::PageRegistry;
