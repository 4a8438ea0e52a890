//! # Larder Service
//!
//! The cache-aside layer and the user service built on it.
//!
//! Reads go through [`ReadThroughCache`], which serves from the key-value
//! store when it can and repopulates it from the database when it cannot.
//! Writes commit to the database first and then hand the affected entity to
//! [`InvalidationCoordinator`], which removes every cache entry the write made
//! stale.

pub mod cache;
pub mod dto;
pub mod r#impl;
pub mod mappers;
pub mod seed;
pub mod user_service;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::*;
pub use dto::*;
pub use r#impl::UserServiceImpl;
pub use user_service::*;
