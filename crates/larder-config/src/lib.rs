//! # Larder Config
//!
//! Configuration management for Larder.
//! Supports layered configuration from files, a `.env` file,
//! and `LARDER_*` environment variables.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
