//! Application configuration loaded from `LEDGERDESK_*` environment variables.
//!
//! Every setting has a default. An unparsable value falls back to it and is
//! recorded in [`AppConfig::fallbacks`]; logging is usually not initialised yet
//! while loading, so callers report them via [`AppConfig::warn_fallbacks`].

use chrono::Duration;

use ledgerdesk_observability::{LogFormat, LogSettings};

pub const LOG_FILTER_VAR: &str = "LEDGERDESK_LOG";
pub const LOG_FORMAT_VAR: &str = "LEDGERDESK_LOG_FORMAT";
pub const API_BASE_URL_VAR: &str = "LEDGERDESK_API_BASE_URL";
pub const SESSION_TTL_VAR: &str = "LEDGERDESK_SESSION_TTL_MINUTES";

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 480;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log: LogSettings,
    /// Base URL of the back-office API. Advisory: no HTTP transport is wired.
    pub api_base_url: String,
    pub session_ttl: Duration,
    /// Human-readable notes about values that were rejected.
    pub fallbacks: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log: LogSettings::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            fallbacks: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(filter) = value(LOG_FILTER_VAR) {
            config.log.filter = filter;
        }

        if let Some(raw) = value(LOG_FORMAT_VAR) {
            match raw.parse::<LogFormat>() {
                Ok(format) => config.log.format = format,
                Err(err) => config
                    .fallbacks
                    .push(format!("{LOG_FORMAT_VAR}: {err}; using json")),
            }
        }

        if let Some(url) = value(API_BASE_URL_VAR) {
            if url.starts_with("http://") || url.starts_with("https://") {
                config.api_base_url = url.trim_end_matches('/').to_string();
            } else {
                config.fallbacks.push(format!(
                    "{API_BASE_URL_VAR}: {url:?} is not an http(s) URL; using {DEFAULT_API_BASE_URL}"
                ));
            }
        }

        if let Some(raw) = value(SESSION_TTL_VAR) {
            match raw.parse::<i64>() {
                Ok(minutes) if minutes > 0 => config.session_ttl = Duration::minutes(minutes),
                _ => config.fallbacks.push(format!(
                    "{SESSION_TTL_VAR}: {raw:?} is not a positive number of minutes; using {DEFAULT_SESSION_TTL_MINUTES}"
                )),
            }
        }

        config
    }

    /// Emit one `warn!` per rejected value.
    pub fn warn_fallbacks(&self) {
        for note in &self.fallbacks {
            tracing::warn!("{note}");
        }
    }
}
