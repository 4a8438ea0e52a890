//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use larder_core::LarderError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Environment variable selecting the environment-specific config file.
pub const ENVIRONMENT_VAR: &str = "LARDER_ENVIRONMENT";

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `{dir}/default.toml` - Default values
    /// 2. `{dir}/{environment}.toml` - Environment-specific overrides
    /// 3. `{dir}/local.toml` - Local overrides, not committed
    /// 4. Environment variables with `LARDER_` prefix (`LARDER_REDIS__URL`)
    ///
    /// A `.env` file in the working directory is read first, so its entries
    /// take part in step 4.
    pub fn new(config_dir: impl Into<PathBuf>) -> Result<Self, LarderError> {
        let config_dir = config_dir.into();

        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let config = Self::load_config(&config_dir, &current_environment(), None)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, LarderError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> Result<(), LarderError> {
        let new_config = Self::load_config(&self.config_dir, &current_environment(), None)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads and validates configuration from `config_dir`.
    ///
    /// `env_overrides` replaces the process environment as the source of
    /// `LARDER_*` variables when given.
    pub fn load_config(
        config_dir: &Path,
        environment: &str,
        env_overrides: Option<HashMap<String, String>>,
    ) -> Result<AppConfig, LarderError> {
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment, "local"] {
            let path = config_dir.join(format!("{name}.toml"));
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("LARDER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env_overrides),
        );

        let config = builder.build().map_err(config_error_to_larder_error)?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_larder_error)?;

        ConfigValidator::validate(&app_config)
            .map_err(|errors| LarderError::Configuration(format_validation_errors(&errors)))?;

        Ok(app_config)
    }
}

fn current_environment() -> String {
    std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string())
}

fn config_error_to_larder_error(err: ConfigError) -> LarderError {
    LarderError::Configuration(err.to_string())
}
