//! Client configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a default so the CLI runs against the hosted backend with
//! no setup. Only malformed URLs are fatal; malformed numbers fall back to
//! their defaults.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://kalaconnect-backend-88269454545.us-central1.run.app";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CALL_DEADLINE_SECS: u64 = 45;
pub const DEFAULT_STATUS_TTL_SECS: u64 = 5;
pub const DEFAULT_PREFS_PATH: &str = ".kalaconnect/prefs.json";
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL for {var}: {value}")]
    InvalidBaseUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
    /// Outer deadline raced against each remote call.
    pub deadline_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    #[must_use]
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            deadline_secs: DEFAULT_CALL_DEADLINE_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub translate_base_url: String,
    pub timeouts: Timeouts,
    pub status_ttl: Duration,
    pub prefs_path: PathBuf,
    pub history_limit: usize,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `KALA_API_BASE_URL`: hosted backend when absent
    /// - `KALA_TRANSLATE_BASE_URL`: defaults to the API base
    /// - `KALA_REQUEST_TIMEOUT_SECS`: default 30
    /// - `KALA_CONNECT_TIMEOUT_SECS`: default 10
    /// - `KALA_CALL_DEADLINE_SECS`: default 45
    /// - `KALA_STATUS_TTL_SECS`: default 5
    /// - `KALA_PREFS_PATH`: default `.kalaconnect/prefs.json`
    /// - `KALA_HISTORY_LIMIT`: default 20
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when a base URL is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = parse_base_url(
            "KALA_API_BASE_URL",
            std::env::var("KALA_API_BASE_URL").ok().as_deref(),
            DEFAULT_API_BASE_URL,
        )?;
        let translate_base_url = parse_base_url(
            "KALA_TRANSLATE_BASE_URL",
            std::env::var("KALA_TRANSLATE_BASE_URL").ok().as_deref(),
            &api_base_url,
        )?;
        let timeouts = Timeouts {
            request_secs: env_parse("KALA_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("KALA_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            deadline_secs: env_parse("KALA_CALL_DEADLINE_SECS", DEFAULT_CALL_DEADLINE_SECS),
        };
        let prefs_path = std::env::var("KALA_PREFS_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_PREFS_PATH), PathBuf::from);

        Ok(Self {
            api_base_url,
            translate_base_url,
            timeouts,
            status_ttl: Duration::from_secs(env_parse("KALA_STATUS_TTL_SECS", DEFAULT_STATUS_TTL_SECS)),
            prefs_path,
            history_limit: env_parse("KALA_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT),
        })
    }

    /// Config pointing both endpoints at `base_url` with default knobs.
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            api_base_url: base.clone(),
            translate_base_url: base,
            timeouts: Timeouts::default(),
            status_ttl: Duration::from_secs(DEFAULT_STATUS_TTL_SECS),
            prefs_path: PathBuf::from(DEFAULT_PREFS_PATH),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_base_url(var: &'static str, raw: Option<&str>, default: &str) -> Result<String, ConfigError> {
    let value = raw.unwrap_or(default).trim();
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl { var, value: value.to_string() });
    }
    Ok(value.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
