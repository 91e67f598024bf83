//! Redirect configuration.
//!
//! Resolved once per plugin from defaults, an optional serialized source
//! (TOML in the binary), and environment overrides:
//!
//! - `REDIRECT_BROWSER_LOG`: `true` turns redirection on, anything else off
//! - `BROWSER_CONNECT_TIMEOUT`: connect budget in milliseconds
//! - `DEBUG`: verbose diagnostics when it contains `browser-log`

use std::time::Duration;

use browserlog_protocol::EventName;
use browserlog_protocol::constants::{
    DEBUG_NAMESPACE, DEFAULT_CONNECT_TIMEOUT, DEFAULT_RETRY_INTERVAL, ENV_BROWSER_CONNECT_TIMEOUT,
    ENV_DEBUG, ENV_REDIRECT_BROWSER_LOG,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Settings for one redirect plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// Whether browser output is redirected at all.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub enabled: bool,

    /// Total budget for connecting to the debugging protocol, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Delay between connection attempts, in milliseconds.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Events that get a default handler.
    #[serde(default = "default_events_to_log")]
    pub events_to_log: Vec<EventName>,

    /// Show debug-level diagnostics.
    #[serde(default)]
    pub verbose: bool,
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
}

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL.as_millis() as u64
}

fn default_events_to_log() -> Vec<EventName> {
    vec![
        EventName::Exception,
        EventName::Error,
        EventName::Warn,
        EventName::Log,
        EventName::TestLog,
    ]
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_interval_ms: default_retry_interval_ms(),
            events_to_log: default_events_to_log(),
            verbose: false,
        }
    }
}

impl RedirectConfig {
    /// Defaults with overrides looked up through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Applies the environment-style overrides on top of the current values.
    /// Keys that are absent leave the field unchanged.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_REDIRECT_BROWSER_LOG) {
            self.enabled = parse_flag(&value);
        }

        if let Some(value) = lookup(ENV_BROWSER_CONNECT_TIMEOUT) {
            self.connect_timeout_ms = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_BROWSER_CONNECT_TIMEOUT.to_string(),
                value: value.clone(),
            })?;
        }

        if lookup(ENV_DEBUG).is_some_and(|value| value.contains(DEBUG_NAMESPACE)) {
            self.verbose = true;
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

/// `true` only for the text `true`, ignoring case and surrounding whitespace.
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => parse_flag(&s),
    })
}
