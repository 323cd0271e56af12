//! # Custom Resource Core
//!
//! Core types for reporting custom resource outcomes back to an
//! infrastructure-orchestration engine.
//!
//! The engine sends a [`LifecycleEvent`](event::LifecycleEvent) for every
//! Create, Update, or Delete of a resource it cannot manage natively, and waits
//! for a [`ResponseEnvelope`](response::ResponseEnvelope) to be `PUT` to the
//! one-time callback URL carried by the event.
//!
//! This crate holds everything that is pure data or pure policy:
//!
//! - **Events**: the inbound lifecycle notification
//! - **Responses**: the outbound envelope and the physical id markers
//! - **Errors**: the action/submit/guard error taxonomy
//! - **Config**: immutable responder configuration
//! - **Environment**: injected I/O traits (callback transport, sleeper)
//! - **Callback**: callback request shape and URL redaction
//!
//! Execution (retry, submission, guarding) lives in `custom-resource-runtime`.
//!
//! ## Example
//!
//! ```
//! use custom_resource_core::event::{LifecycleEvent, RequestType};
//! use custom_resource_core::response::{ResponseEnvelope, ResponseStatus, SubmitOptions};
//! use custom_resource_core::response::PhysicalIdMarkers;
//!
//! let event = LifecycleEvent::new(
//!     RequestType::Create,
//!     "https://callback.example.com/path?signature=secret",
//! );
//! let envelope = ResponseEnvelope::build(
//!     ResponseStatus::Success,
//!     &event,
//!     &SubmitOptions::default(),
//!     &PhysicalIdMarkers::default(),
//! );
//! assert_eq!(envelope.reason, "SUCCESS");
//! ```

pub mod callback;
pub mod config;
pub mod environment;
pub mod error;
pub mod event;
pub mod response;

// Re-export commonly used types
pub use config::{ConfigError, ResponderConfig};
pub use error::{Failure, GuardError, HandlerError, Retry, SubmitError, TransportError};
pub use event::{LifecycleEvent, RequestType};
pub use response::{
    CREATE_FAILED_PHYSICAL_ID_MARKER, MISSING_PHYSICAL_ID_MARKER, PhysicalIdMarkers,
    ResponseEnvelope, ResponseStatus, SubmitOptions,
};
