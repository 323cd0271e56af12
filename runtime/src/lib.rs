//! # Custom Resource Runtime
//!
//! Runtime for answering custom resource lifecycle events.
//!
//! This crate executes what `custom-resource-core` describes: it delivers
//! response envelopes to the callback URL and guards user provisioning logic
//! so that every failure is reported exactly once.
//!
//! ## Core Components
//!
//! - **`ResponseSubmitter`**: builds, logs, and delivers the envelope with
//!   fixed-delay retry
//! - **`HandlerGuard`**: wraps a `LifecycleAction`, short-circuits orphaned
//!   deletes, converts failures to `FAILED`, and propagates retry requests
//! - **Retry**: generic fixed-delay retry with an injectable sleeper
//! - **Transport**: `reqwest` callback transport and tokio sleeper
//!
//! ## Example
//!
//! ```ignore
//! use custom_resource_runtime::{HandlerGuard, telemetry};
//! use custom_resource_core::ResponderConfig;
//!
//! telemetry::init_tracing("info")?;
//! let config = ResponderConfig::from_env()?;
//! let guard = HandlerGuard::from_config(MyProvider, &config)?;
//!
//! // Per invocation
//! guard.handle(event).await?;
//! ```

/// Handler guard around user provisioning logic
pub mod guard;

/// Metric names and descriptions
pub mod metrics;

/// Fixed-delay retry for transient failures
pub mod retry;

/// Response envelope submission
pub mod submitter;

/// Logging setup
pub mod telemetry;

/// Production transport and sleeper
pub mod transport;

// Re-export commonly used types
pub use guard::{HandlerGuard, LifecycleAction, guard};
pub use retry::{RetryPolicy, retry_with_fixed_delay};
pub use submitter::ResponseSubmitter;
pub use transport::{ReqwestTransport, TokioSleeper};
