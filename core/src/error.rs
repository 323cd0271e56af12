//! Error taxonomy for actions, submissions, and the handler guard.
//!
//! - [`HandlerError`]: what a lifecycle action may return. The
//!   [`HandlerError::Retry`] variant is the only one the guard propagates; every
//!   other failure becomes a `FAILED` callback.
//! - [`TransportError`]: a single callback attempt failed.
//! - [`SubmitError`]: a submission could not be delivered.
//! - [`GuardError`]: what escapes the guard (retry signal or undeliverable
//!   callback).

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Signal asking the invocation runtime to re-run the whole handler.
///
/// Carries only a message. The guard recognises it by its
/// [`HandlerError::Retry`] variant, never by message content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Retry {
    message: String,
}

impl Retry {
    /// Create a retry signal with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message given when the retry was requested.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for Retry {
    fn default() -> Self {
        Self::new("retry requested")
    }
}

/// An ordinary action failure together with the stack it was caught on.
///
/// The stack is captured unconditionally when the failure is created, unless
/// the wrapped `anyhow::Error` already carries one (`RUST_BACKTRACE` /
/// `RUST_LIB_BACKTRACE` set).
#[derive(Debug)]
pub struct Failure {
    error: anyhow::Error,
    backtrace: Backtrace,
}

impl Failure {
    /// Wrap `error`, capturing the current stack if it has none.
    pub fn new<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        let error = error.into();
        let backtrace = if error.backtrace().status() == BacktraceStatus::Captured {
            Backtrace::disabled()
        } else {
            Backtrace::force_capture()
        };
        Self { error, backtrace }
    }

    /// The underlying error.
    #[must_use]
    pub const fn error(&self) -> &anyhow::Error {
        &self.error
    }

    /// Unwrap into the underlying error.
    #[must_use]
    pub fn into_error(self) -> anyhow::Error {
        self.error
    }

    /// Error chain followed by the stack backtrace.
    #[must_use]
    pub fn trace(&self) -> String {
        // anyhow renders its own backtrace, when it has one, in Debug
        let mut trace = format!("{:?}", self.error);
        if self.backtrace.status() == BacktraceStatus::Captured {
            trace.push_str("\n\nStack backtrace:\n");
            trace.push_str(&self.backtrace.to_string());
        }
        trace
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

/// Errors a lifecycle action may return.
///
/// Any error converts into [`HandlerError::Failed`] through `anyhow`:
///
/// ```
/// use anyhow::Context;
/// use custom_resource_core::error::HandlerError;
///
/// fn provision() -> Result<(), HandlerError> {
///     std::fs::metadata("/definitely/not/here").context("checking template")?;
///     Ok(())
/// }
///
/// assert!(matches!(provision(), Err(HandlerError::Failed(_))));
/// ```
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Re-invoke the handler later; no callback is sent now
    #[error("retry requested: {0}")]
    Retry(#[from] Retry),

    /// Ordinary failure, reported to the engine as `FAILED`
    #[error(transparent)]
    Failed(#[from] Failure),
}

impl From<anyhow::Error> for HandlerError {
    fn from(error: anyhow::Error) -> Self {
        Self::Failed(Failure::new(error))
    }
}

impl HandlerError {
    /// Wrap any error as an ordinary failure.
    pub fn failed<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Failed(Failure::new(error))
    }

    /// Whether this is the retry signal.
    #[must_use]
    pub const fn is_retry(&self) -> bool {
        matches!(self, Self::Retry(_))
    }

    /// Text used as the `Reason` of a `FAILED` response.
    ///
    /// With `include_trace` the full diagnostic form is used: the error chain
    /// followed by the stack backtrace (see [`Failure::trace`]). Otherwise
    /// only the top-level message.
    #[must_use]
    pub fn reason(&self, include_trace: bool) -> String {
        match self {
            Self::Retry(retry) => retry.message().to_string(),
            Self::Failed(failure) if include_trace => failure.trace(),
            Self::Failed(failure) => failure.to_string(),
        }
    }
}

/// A single callback attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection, TLS, or protocol failure
    #[error("Callback request failed: {0}")]
    Request(String),

    /// No response within the per-request timeout
    #[error("Callback request timed out after {0:?}")]
    Timeout(Duration),
}

/// A response could not be submitted.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The event's callback URL does not parse
    #[error("Invalid callback URL: {0}")]
    InvalidCallbackUrl(#[from] url::ParseError),

    /// The envelope could not be serialized
    #[error("Failed to serialize response envelope: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Every delivery attempt failed
    #[error("Callback delivery failed after {attempts} attempts: {source}")]
    Delivery {
        /// Attempts made
        attempts: u32,
        /// Error from the last attempt
        #[source]
        source: TransportError,
    },
}

/// Errors that escape the handler guard.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The action asked to be re-invoked
    #[error("Retry requested by handler: {0}")]
    Retry(Retry),

    /// The outcome could not be reported
    #[error(transparent)]
    Delivery(#[from] SubmitError),
}

impl GuardError {
    /// The retry signal, if this is one.
    #[must_use]
    pub const fn as_retry(&self) -> Option<&Retry> {
        match self {
            Self::Retry(retry) => Some(retry),
            Self::Delivery(_) => None,
        }
    }
}
