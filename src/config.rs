//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Store Configuration
//!
//! ### Method 1: Full URL
//!
//! ```bash
//! export REDIS_URL="redis://:password@localhost:6379/0"
//! ```
//!
//! ### Method 2: Individual components
//!
//! ```bash
//! export REDIS_HOST="localhost"
//! export REDIS_PORT="6379"
//! export REDIS_PASSWORD=""
//! export REDIS_DB="0"
//! ```
//!
//! If neither `REDIS_URL` nor `REDIS_HOST` is set, the service runs on the
//! in-process store: links and quotas are lost on restart and not shared
//! between instances.
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `127.0.0.1:8080`)
//! - `BASE_URL` - Public base of generated short links (default: `http://localhost:8080`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `BEHIND_PROXY` - Identify clients by `X-Forwarded-For` / `X-Real-IP` (default: `false`)
//! - `RATE_LIMIT_QUOTA` - Creations per client per window (default: 10)
//! - `RATE_LIMIT_WINDOW_SECONDS` - Window length (default: 120)
//! - `LINK_TTL_SECONDS` - Lifetime of a short link (default: 86400)
//! - `CODE_LENGTH` - Generated code length (default: 6)
//! - `CODE_MAX_ATTEMPTS` - Draws before giving up on a free code (default: 10)
//! - `STORE_CONNECT_RETRIES` - Redis connection retries at startup (default: 3)

use crate::application::services::LinkSettings;
use crate::domain::entities::RateLimitPolicy;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for any expiry setting: ten years.
const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 3600;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` selects the in-process store.
    pub redis_url: Option<String>,
    pub listen_addr: String,
    pub base_url: String,
    pub log_level: String,
    pub log_format: String,
    /// When true, the client identifier is read from X-Forwarded-For / X-Real-IP headers.
    /// Enable only when the service is behind a trusted reverse proxy.
    pub behind_proxy: bool,
    pub rate_limit_quota: u32,
    pub rate_limit_window_seconds: u64,
    pub link_ttl_seconds: u64,
    pub code_length: usize,
    pub code_max_attempts: u32,
    pub store_connect_retries: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let redis_url = Self::load_redis_url();

        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let behind_proxy = env::var("BEHIND_PROXY")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Ok(Self {
            redis_url,
            listen_addr,
            base_url,
            log_level,
            log_format,
            behind_proxy,
            rate_limit_quota: parse_var("RATE_LIMIT_QUOTA", 10)?,
            rate_limit_window_seconds: parse_var("RATE_LIMIT_WINDOW_SECONDS", 120)?,
            link_ttl_seconds: parse_var("LINK_TTL_SECONDS", 24 * 3600)?,
            code_length: parse_var("CODE_LENGTH", 6)?,
            code_max_attempts: parse_var("CODE_MAX_ATTEMPTS", 10)?,
            store_connect_retries: parse_var("STORE_CONNECT_RETRIES", 3)?,
        })
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    ///
    /// Returns `None` if Redis is not configured.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let password = env::var("REDIS_PASSWORD").ok();
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        let url = match password {
            Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        Some(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is out of range or malformed.
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        let base = url::Url::parse(&self.base_url)
            .with_context(|| format!("BASE_URL is not a valid URL: '{}'", self.base_url))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            anyhow::bail!(
                "BASE_URL must use http or https, got '{}'",
                self.base_url
            );
        }

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                mask_connection_string(redis_url)
            );
        }

        if self.rate_limit_quota == 0 {
            anyhow::bail!("RATE_LIMIT_QUOTA must be at least 1");
        }
        if !(1..=MAX_TTL_SECONDS).contains(&self.rate_limit_window_seconds) {
            anyhow::bail!(
                "RATE_LIMIT_WINDOW_SECONDS must be between 1 and {}, got {}",
                MAX_TTL_SECONDS,
                self.rate_limit_window_seconds
            );
        }
        if !(1..=MAX_TTL_SECONDS).contains(&self.link_ttl_seconds) {
            anyhow::bail!(
                "LINK_TTL_SECONDS must be between 1 and {}, got {}",
                MAX_TTL_SECONDS,
                self.link_ttl_seconds
            );
        }
        if !(4..=32).contains(&self.code_length) {
            anyhow::bail!(
                "CODE_LENGTH must be between 4 and 32, got {}",
                self.code_length
            );
        }
        if self.code_max_attempts == 0 {
            anyhow::bail!("CODE_MAX_ATTEMPTS must be at least 1");
        }

        Ok(())
    }

    /// Returns whether the Redis store is configured.
    pub fn is_redis_enabled(&self) -> bool {
        self.redis_url.is_some()
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            quota: self.rate_limit_quota,
            window: Duration::from_secs(self.rate_limit_window_seconds),
        }
    }

    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            base_url: self.base_url.clone(),
            link_ttl: Duration::from_secs(self.link_ttl_seconds),
        }
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Base URL: {}", self.base_url);

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!("  Store: Redis at {}", mask_connection_string(redis_url));
        } else {
            tracing::info!("  Store: in-process memory");
        }

        tracing::info!(
            "  Rate limit: {} per {}s",
            self.rate_limit_quota,
            self.rate_limit_window_seconds
        );
        tracing::info!("  Link TTL: {}s", self.link_ttl_seconds);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Parses an optional numeric variable, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

/// Masks sensitive information in connection strings for logging.
///
/// Replaces password with `***` in URLs like:
/// - `redis://:password@host:port/db` → `redis://:***@host:port/db`
pub fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
