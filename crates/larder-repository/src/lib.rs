//! # Larder Repository
//!
//! The durable store behind the cache: a SQLx MySQL pool and the
//! [`MySqlUserRepository`] implementation of [`UserRepository`].

pub mod mysql;
pub mod pool;
pub mod traits;

pub use mysql::*;
pub use pool::*;
pub use traits::*;
