//! Dependency injection traits.
//!
//! All I/O the responder performs goes through these traits so the submitter
//! and guard can be exercised without a network or a wall clock.
//!
//! # Implementations
//!
//! - `ReqwestTransport`, `TokioSleeper` (in `custom-resource-runtime`): production
//! - `RecordingTransport`, `RecordingSleeper` (in `custom-resource-testing`): tests
//!
//! # Dyn Compatibility
//!
//! The traits return `Pin<Box<dyn Future>>` instead of using `async fn` so that
//! they can be held as `Arc<dyn CallbackTransport>` / `Arc<dyn Sleeper>`.

use crate::callback::{CallbackReceipt, CallbackRequest};
use crate::error::TransportError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Sends a single callback `PUT`.
///
/// One call is one attempt; retrying is the caller's job.
pub trait CallbackTransport: Send + Sync {
    /// Deliver `request` to its URL.
    ///
    /// Any HTTP response, whatever its status, is a receipt. Only failures to
    /// obtain a response are errors.
    ///
    /// # Errors
    ///
    /// - `Request`: connection, TLS, or protocol failure
    /// - `Timeout`: no response within the transport's timeout
    fn put<'a>(
        &'a self,
        request: &'a CallbackRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CallbackReceipt, TransportError>> + Send + 'a>>;
}

/// Suspends between delivery attempts.
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`.
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}
