//! Runtime configuration for the todo list.
//!
//! Values come from environment variables, each with a default:
//!
//! | variable | default |
//! |---|---|
//! | `TODO_SOURCE_URL` | `https://jsonplaceholder.typicode.com/todos` |
//! | `TODO_LOAD_LIMIT` | `10` |
//! | `TODO_REQUEST_TIMEOUT_SECS` | `10` (at most 300) |
//! | `TODO_STALE_LOAD_POLICY` | `reject` |
//! | `TODO_FETCH_ATTEMPTS` | `1` (at most 10) |

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use todolist_runtime::RetryPolicy;

/// Default list endpoint
pub const DEFAULT_SOURCE_URL: &str = "https://jsonplaceholder.typicode.com/todos";

/// Default number of items kept from a load
pub const DEFAULT_LOAD_LIMIT: usize = 10;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Upper bound for `TODO_REQUEST_TIMEOUT_SECS`
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Upper bound for `TODO_FETCH_ATTEMPTS`
pub const MAX_FETCH_ATTEMPTS: u32 = 10;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to something unusable
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            var,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// What to do with a load result that arrives after local changes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleLoadPolicy {
    /// Keep local changes and drop the result
    #[default]
    Reject,
    /// Replace the list with the result anyway
    Overwrite,
}

impl FromStr for StaleLoadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "overwrite" => Ok(Self::Overwrite),
            _ => Err("expected `reject` or `overwrite`".to_string()),
        }
    }
}

/// How load results are applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadSettings {
    /// Items kept from the head of a load
    pub limit: usize,
    /// Handling of results that race local changes
    pub stale_policy: StaleLoadPolicy,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LOAD_LIMIT,
            stale_policy: StaleLoadPolicy::default(),
        }
    }
}

/// Todo list configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoConfig {
    /// List endpoint
    pub source_url: String,
    /// Items kept from the head of a load
    pub load_limit: usize,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Handling of results that race local changes
    pub stale_load_policy: StaleLoadPolicy,
    /// Fetch attempts per load, including the first
    pub fetch_attempts: u32,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            load_limit: DEFAULT_LOAD_LIMIT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            stale_load_policy: StaleLoadPolicy::default(),
            fetch_attempts: 1,
        }
    }
}

impl TodoConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable cannot be parsed
    /// or fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable cannot be parsed
    /// or fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            source_url: lookup("TODO_SOURCE_URL").unwrap_or(defaults.source_url),
            load_limit: parse_var(&lookup, "TODO_LOAD_LIMIT")?.unwrap_or(defaults.load_limit),
            request_timeout_secs: parse_var(&lookup, "TODO_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            stale_load_policy: parse_var(&lookup, "TODO_STALE_LOAD_POLICY")?
                .unwrap_or(defaults.stale_load_policy),
            fetch_attempts: parse_var(&lookup, "TODO_FETCH_ATTEMPTS")?
                .unwrap_or(defaults.fetch_attempts),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.load_limit == 0 {
            return Err(ConfigError::invalid(
                "TODO_LOAD_LIMIT",
                "0",
                "must be greater than zero",
            ));
        }
        if !(self.source_url.starts_with("http://") || self.source_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "TODO_SOURCE_URL",
                self.source_url.clone(),
                "must be an http or https URL",
            ));
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ConfigError::invalid(
                "TODO_REQUEST_TIMEOUT_SECS",
                self.request_timeout_secs.to_string(),
                format!("must be between 1 and {MAX_REQUEST_TIMEOUT_SECS}"),
            ));
        }
        if !(1..=MAX_FETCH_ATTEMPTS).contains(&self.fetch_attempts) {
            return Err(ConfigError::invalid(
                "TODO_FETCH_ATTEMPTS",
                self.fetch_attempts.to_string(),
                format!("must be between 1 and {MAX_FETCH_ATTEMPTS}"),
            ));
        }
        Ok(())
    }

    /// Per-request timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Longest a load can take: every attempt timing out, each followed by
    /// the longest retry backoff
    #[must_use]
    pub fn load_budget(&self) -> Duration {
        self.request_timeout()
            .saturating_add(RetryPolicy::default().max_delay())
            .saturating_mul(self.fetch_attempts)
    }

    /// Settings the reducer applies to load results
    #[must_use]
    pub const fn load_settings(&self) -> LoadSettings {
        LoadSettings {
            limit: self.load_limit,
            stale_policy: self.stale_load_policy,
        }
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(var)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::invalid(var, raw.clone(), e.to_string()))
        })
        .transpose()
}
