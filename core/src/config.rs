//! Responder configuration.
//!
//! Configuration is read once at startup and then shared read-only by every
//! invocation. Nothing here is mutable after construction.
//!
//! # Example
//!
//! ```
//! use custom_resource_core::config::ResponderConfig;
//! use std::time::Duration;
//!
//! let config = ResponderConfig::default()
//!     .with_include_stack_traces(false)
//!     .with_delivery_retry(3, Duration::from_millis(250));
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.delivery_attempts, 3);
//! ```

use crate::response::PhysicalIdMarkers;
use std::time::Duration;
use thiserror::Error;

/// Toggle for full diagnostic detail in `FAILED` reasons.
pub const ENV_INCLUDE_STACK_TRACES: &str = "CUSTOM_RESOURCE_INCLUDE_STACK_TRACES";
/// Number of callback delivery attempts.
pub const ENV_DELIVERY_ATTEMPTS: &str = "CUSTOM_RESOURCE_DELIVERY_ATTEMPTS";
/// Fixed delay between delivery attempts, in milliseconds.
pub const ENV_DELIVERY_DELAY_MS: &str = "CUSTOM_RESOURCE_DELIVERY_DELAY_MS";
/// Per-request timeout of the HTTP transport, in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "CUSTOM_RESOURCE_REQUEST_TIMEOUT_SECS";

/// Default number of delivery attempts.
pub const DEFAULT_DELIVERY_ATTEMPTS: u32 = 5;
/// Default delay between delivery attempts.
pub const DEFAULT_DELIVERY_DELAY: Duration = Duration::from_millis(1000);
/// Default per-request timeout of the HTTP transport.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        /// Variable name
        var: String,
        /// Raw value
        value: String,
        /// What was expected
        reason: String,
    },

    /// Values parse but are inconsistent
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Immutable configuration shared by the submitter and the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderConfig {
    /// Use the full error chain (and backtrace, when captured) as the `FAILED`
    /// reason instead of the short message
    pub include_stack_traces: bool,
    /// Callback delivery attempts, including the first
    pub delivery_attempts: u32,
    /// Fixed delay between delivery attempts
    pub delivery_delay: Duration,
    /// Per-request timeout of the HTTP transport
    pub request_timeout: Duration,
    /// Physical id markers
    pub markers: PhysicalIdMarkers,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            include_stack_traces: true,
            delivery_attempts: DEFAULT_DELIVERY_ATTEMPTS,
            delivery_delay: DEFAULT_DELIVERY_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            markers: PhysicalIdMarkers::default(),
        }
    }
}

impl ResponderConfig {
    /// Load configuration from process environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an unparsable value or the
    /// resulting configuration fails [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_INCLUDE_STACK_TRACES) {
            config.include_stack_traces = parse_bool(ENV_INCLUDE_STACK_TRACES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DELIVERY_ATTEMPTS) {
            config.delivery_attempts = parse_number(ENV_DELIVERY_ATTEMPTS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DELIVERY_DELAY_MS) {
            config.delivery_delay =
                Duration::from_millis(parse_number(ENV_DELIVERY_DELAY_MS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout =
                Duration::from_secs(parse_number(ENV_REQUEST_TIMEOUT_SECS, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delivery_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "delivery_attempts must be > 0".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "request_timeout must be > 0".to_string(),
            ));
        }
        if self.markers.create_failed().is_empty() || self.markers.missing().is_empty() {
            return Err(ConfigError::ValidationError(
                "physical id markers cannot be empty".to_string(),
            ));
        }
        if self.markers.create_failed() == self.markers.missing() {
            return Err(ConfigError::ValidationError(
                "physical id markers must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Set whether `FAILED` reasons carry full diagnostic detail.
    #[must_use]
    pub const fn with_include_stack_traces(mut self, include: bool) -> Self {
        self.include_stack_traces = include;
        self
    }

    /// Set the delivery attempt count and fixed delay.
    #[must_use]
    pub const fn with_delivery_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.delivery_attempts = attempts;
        self.delivery_delay = delay;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Replace the physical id markers.
    #[must_use]
    pub fn with_markers(mut self, markers: PhysicalIdMarkers) -> Self {
        self.markers = markers;
        self
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn parse_number<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var: var.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
