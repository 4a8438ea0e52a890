//! Startup utilities.

use larder_config::AppConfig;
use tracing::info;

/// Strips the password from a connection URL for logging.
#[must_use]
pub fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.split_once(':') {
                Some((user, _)) => format!("{}{user}:***{}", &url[..scheme_end + 3], &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

/// Logs the effective configuration.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("Larder {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);
    info!("Database:    {}", redact_url(&config.database.url));
    if config.redis.enabled {
        info!("Redis:       {}", redact_url(&config.redis.url));
    } else {
        info!("Redis:       disabled");
    }
    info!(
        "Cache:       namespace '{}', list TTL {}s, entity TTL {}s",
        config.cache.namespace, config.cache.list_ttl_secs, config.cache.entity_ttl_secs
    );
    info!("{}", separator);
}
