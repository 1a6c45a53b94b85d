//! Configuration management for ynab-snapshot.
//!
//! Configuration can be set via environment variables:
//! - `YNAB_TOKEN` - Required. Your YNAB personal access token.
//! - `YNAB_BASE_URL` - Optional. API base URL. Defaults to `https://api.youneedabudget.com/v1`.
//! - `SNAPSHOT_MONTH` - Optional. `current` or `YYYY-MM`. Defaults to `current`.
//! - `YNAB_RATE_LIMIT_MS` - Optional. Minimum spacing between month lookups. Defaults to `50`.
//! - `YNAB_POLL_INTERVAL_MS` - Optional. Pause between collector passes. Defaults to `50`.
//! - `YNAB_REQUEST_TIMEOUT_SECS` - Optional. Per-request HTTP timeout. Defaults to `30`.
//! - `YNAB_MERGE_POLICY` - Optional. `full` or `monthly`. Defaults to `full`.
//! - `SNAPSHOT_INCLUDE_EMPTY` - Optional. Also emit categories with zero budgeted and balance.

use std::time::Duration;
use thiserror::Error;

use crate::month::Month;
use crate::snapshot::MergePolicy;
use crate::util::{env_var_bool, env_var_millis, env_var_parse};
use crate::ynab::DEFAULT_BASE_URL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Snapshot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// YNAB personal access token
    pub api_token: String,

    /// API base URL
    pub base_url: String,

    /// Month to snapshot
    pub month: Month,

    /// Minimum spacing between outbound month lookups
    pub rate_limit_interval: Duration,

    /// Pause between collector polling passes
    pub poll_interval: Duration,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// Which fields a month lookup overwrites
    pub merge_policy: MergePolicy,

    /// Emit categories with nothing budgeted and a zero balance
    pub include_empty: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `YNAB_TOKEN` is not set, and
    /// `ConfigError::InvalidValue` if any optional variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("YNAB_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("YNAB_TOKEN".to_string()))?;

        let base_url =
            std::env::var("YNAB_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let month = env_var_parse("SNAPSHOT_MONTH", Month::Current)
            .map_err(|e| ConfigError::InvalidValue("SNAPSHOT_MONTH".to_string(), e))?;

        let rate_limit_interval = env_var_millis("YNAB_RATE_LIMIT_MS", 50)
            .map_err(|e| ConfigError::InvalidValue("YNAB_RATE_LIMIT_MS".to_string(), e))?;

        let poll_interval = env_var_millis("YNAB_POLL_INTERVAL_MS", 50)
            .map_err(|e| ConfigError::InvalidValue("YNAB_POLL_INTERVAL_MS".to_string(), e))?;

        let request_timeout = env_var_parse("YNAB_REQUEST_TIMEOUT_SECS", 30u64)
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidValue("YNAB_REQUEST_TIMEOUT_SECS".to_string(), e))?;

        let merge_policy = env_var_parse("YNAB_MERGE_POLICY", MergePolicy::Full)
            .map_err(|e| ConfigError::InvalidValue("YNAB_MERGE_POLICY".to_string(), e))?;

        let include_empty = env_var_bool("SNAPSHOT_INCLUDE_EMPTY", false);

        Ok(Self {
            api_token,
            base_url,
            month,
            rate_limit_interval,
            poll_interval,
            request_timeout,
            merge_policy,
            include_empty,
        })
    }

    /// Create a config with default values (useful for testing).
    pub fn new(api_token: String) -> Self {
        Self {
            api_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            month: Month::Current,
            rate_limit_interval: Duration::from_millis(50),
            poll_interval: Duration::from_millis(50),
            request_timeout: Duration::from_secs(30),
            merge_policy: MergePolicy::Full,
            include_empty: false,
        }
    }
}
