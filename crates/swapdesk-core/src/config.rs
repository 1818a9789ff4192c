//! Runtime configuration.
//!
//! Defaults are overridden by environment variables, and the CLI applies its
//! own flags on top of the result.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SWAPDESK_PRICES_URL` | `https://interview.switcheo.com/prices.json` |
//! | `SWAPDESK_ICON_BASE_URL` | Switcheo token-icons repository |
//! | `SWAPDESK_SETTLEMENT_MS` | `3000` |
//! | `SWAPDESK_TIMEOUT_MS` | `10000` |
//! | `SWAPDESK_MAX_RETRIES` | `2` |

use std::time::Duration;

use thiserror::Error;

use crate::domain::DEFAULT_ICON_BASE_URL;
use crate::{IconTemplate, RetryConfig};

pub const DEFAULT_PRICES_URL: &str = "https://interview.switcheo.com/prices.json";

pub const ENV_PRICES_URL: &str = "SWAPDESK_PRICES_URL";
pub const ENV_ICON_BASE_URL: &str = "SWAPDESK_ICON_BASE_URL";
pub const ENV_SETTLEMENT_MS: &str = "SWAPDESK_SETTLEMENT_MS";
pub const ENV_TIMEOUT_MS: &str = "SWAPDESK_TIMEOUT_MS";
pub const ENV_MAX_RETRIES: &str = "SWAPDESK_MAX_RETRIES";

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must be an http(s) URL, got '{value}'")]
    InvalidUrl { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    ZeroTimeout { key: &'static str },
}

/// Resolved swapdesk configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapConfig {
    pub prices_url: String,
    pub icon_base_url: String,
    pub settlement_delay: Duration,
    pub http_timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            prices_url: String::from(DEFAULT_PRICES_URL),
            icon_base_url: String::from(DEFAULT_ICON_BASE_URL),
            settlement_delay: Duration::from_millis(3_000),
            http_timeout_ms: 10_000,
            retry: RetryConfig::default(),
        }
    }
}

impl SwapConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_PRICES_URL) {
            config.prices_url = parse_url(ENV_PRICES_URL, &url)?;
        }
        if let Some(url) = lookup(ENV_ICON_BASE_URL) {
            config.icon_base_url = parse_url(ENV_ICON_BASE_URL, &url)?;
        }
        if let Some(value) = lookup(ENV_SETTLEMENT_MS) {
            config.settlement_delay = Duration::from_millis(parse_u64(ENV_SETTLEMENT_MS, &value)?);
        }
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            let timeout_ms = parse_u64(ENV_TIMEOUT_MS, &value)?;
            if timeout_ms == 0 {
                return Err(ConfigError::ZeroTimeout {
                    key: ENV_TIMEOUT_MS,
                });
            }
            config.http_timeout_ms = timeout_ms;
        }
        if let Some(value) = lookup(ENV_MAX_RETRIES) {
            let max_retries = parse_u64(ENV_MAX_RETRIES, &value)?;
            let max_retries = u32::try_from(max_retries).map_err(|_| ConfigError::InvalidNumber {
                key: ENV_MAX_RETRIES,
                value: value.clone(),
            })?;
            config.retry = if max_retries == 0 {
                RetryConfig::no_retry()
            } else {
                RetryConfig::exponential(max_retries)
            };
        }

        Ok(config)
    }

    /// Replaces the price-feed URL, applying the same check as
    /// `SWAPDESK_PRICES_URL`. `key` names the setting in the error.
    pub fn override_prices_url(
        &mut self,
        key: &'static str,
        url: &str,
    ) -> Result<(), ConfigError> {
        self.prices_url = parse_url(key, url)?;
        Ok(())
    }

    pub fn icon_template(&self) -> IconTemplate {
        IconTemplate::new(self.icon_base_url.as_str())
    }
}

fn parse_u64(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber {
            key,
            value: value.to_owned(),
        })
}

fn parse_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidUrl {
            key,
            value: value.to_owned(),
        })
    }
}
