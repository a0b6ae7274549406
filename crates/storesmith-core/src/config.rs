//! Runtime configuration for the scrape pipeline.
//!
//! All knobs have defaults matching the pipeline's fixed budgets, so the
//! zero-config path works out of the box; `STORESMITH_*` env vars override.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default user agent for outbound page fetches. Browser-like because many
/// storefronts serve reduced markup (or a challenge page) to obvious bots.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Tunables consumed by the scraper crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// TCP connect timeout for the shared HTTP client.
    pub connect_timeout_secs: u64,
    /// Timeout for the primary product-page fetch.
    pub page_timeout_secs: u64,
    /// Timeout for secondary lightweight API fetches.
    pub api_timeout_secs: u64,
    /// User agent sent on the first fetch attempt.
    pub user_agent: String,
    /// Total fetch attempts per URL before giving up.
    pub fetch_attempts: usize,
    /// Currency code assumed when the page does not state one.
    pub default_currency: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            page_timeout_secs: 20,
            api_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_attempts: 3,
            default_currency: "USD".to_string(),
        }
    }
}

/// Load scrape configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` first so a local `.env` file is honored.
///
/// # Errors
///
/// Returns [`ConfigError`] if an override is present but unparsable.
pub fn load_config() -> Result<ScrapeConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_from_env()
}

/// Load scrape configuration from env vars already in the process, without
/// touching `.env` files.
///
/// # Errors
///
/// Returns [`ConfigError`] if an override is present but unparsable.
pub fn load_config_from_env() -> Result<ScrapeConfig, ConfigError> {
    build_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup instead of `set_var`/`remove_var`.
fn build_config<F>(lookup: F) -> Result<ScrapeConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = ScrapeConfig::default();

    let or_default =
        |var: &str, default: String| -> String { lookup(var).unwrap_or(default) };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
        }
    };

    Ok(ScrapeConfig {
        connect_timeout_secs: parse_u64(
            "STORESMITH_CONNECT_TIMEOUT_SECS",
            defaults.connect_timeout_secs,
        )?,
        page_timeout_secs: parse_u64("STORESMITH_PAGE_TIMEOUT_SECS", defaults.page_timeout_secs)?,
        api_timeout_secs: parse_u64("STORESMITH_API_TIMEOUT_SECS", defaults.api_timeout_secs)?,
        user_agent: or_default("STORESMITH_USER_AGENT", defaults.user_agent),
        fetch_attempts: parse_usize("STORESMITH_FETCH_ATTEMPTS", defaults.fetch_attempts)?,
        default_currency: or_default("STORESMITH_DEFAULT_CURRENCY", defaults.default_currency),
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
