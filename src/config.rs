//! Configuration loader for the `firehawk-feed` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;

use anyhow::{anyhow, Result};

use crate::aggregate::TABLE_WINDOW;

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_num {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Read an optional string environment variable, treating blank as unset.
fn optional_env(var_name: &str) -> Option<String> {
    env::var(var_name).ok().filter(|v| !v.trim().is_empty())
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Raw incident feed (JSON array) fetched with GET.
    pub feed_url: String,

    /// Upstream recompute trigger, POSTed before a refresh re-fetch.
    pub refresh_url: Option<String>,

    /// Base URL of the credential services.
    pub auth_api_url: Option<String>,

    /// Number of most recent incidents kept for the table and map.
    pub table_window: usize,

    /// Per-request timeout for upstream calls.
    pub http_timeout_secs: u64,

    /// Product token used in report titles and filenames.
    pub product_name: String,

    /// HTTP bind port.
    pub listen_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `FEED_URL` – raw incident feed URL
///
/// Optional:
/// - `REFRESH_URL` – upstream recompute endpoint (refresh disabled if unset)
/// - `AUTH_API_URL` – credential service base URL (login proxy disabled if unset)
/// - `TABLE_WINDOW` – recency window size (default: 20)
/// - `HTTP_TIMEOUT_SECS` – upstream request timeout (default: 30)
/// - `PRODUCT_NAME` – report product token (default: `FireHawk`)
/// - `LISTEN_PORT` – bind port (default: 8080)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let feed_url = require_env!("FEED_URL");
    let table_window = parse_env_num!("TABLE_WINDOW", usize, TABLE_WINDOW);
    let http_timeout_secs = parse_env_num!("HTTP_TIMEOUT_SECS", u64, 30);
    let listen_port = parse_env_num!("LISTEN_PORT", u16, 8080);

    if table_window == 0 {
        return Err(anyhow!("Invalid TABLE_WINDOW: must be at least 1"));
    }

    Ok(Config {
        feed_url,
        refresh_url: optional_env("REFRESH_URL"),
        auth_api_url: optional_env("AUTH_API_URL"),
        table_window,
        http_timeout_secs,
        product_name: optional_env("PRODUCT_NAME").unwrap_or_else(|| "FireHawk".to_string()),
        listen_port,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        let unset = || "(unset)".to_string();

        tracing::info!("Configuration loaded:");
        tracing::info!("  FEED_URL          : {}", self.feed_url);
        tracing::info!("  REFRESH_URL       : {}", self.refresh_url.clone().unwrap_or_else(unset));
        tracing::info!("  AUTH_API_URL      : {}", self.auth_api_url.clone().unwrap_or_else(unset));
        tracing::info!("  TABLE_WINDOW      : {}", self.table_window);
        tracing::info!("  HTTP_TIMEOUT_SECS : {}", self.http_timeout_secs);
        tracing::info!("  PRODUCT_NAME      : {}", self.product_name);
        tracing::info!("  LISTEN_PORT       : {}", self.listen_port);
    }
}
