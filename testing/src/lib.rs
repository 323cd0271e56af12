//! # Custom Resource Testing
//!
//! Testing utilities and helpers for custom resource responders.
//!
//! This crate provides:
//! - Mock implementations of the environment traits
//! - Event fixtures with a realistic signed callback URL
//! - Log capture for asserting on tracing output
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use custom_resource_testing::{fixtures, RecordingSleeper, RecordingTransport};
//!
//! #[tokio::test]
//! async fn test_failure_is_reported() {
//!     let transport = RecordingTransport::new();
//!     let submitter = ResponseSubmitter::new(
//!         Arc::new(transport.clone()),
//!         Arc::new(RecordingSleeper::new()),
//!         &ResponderConfig::default(),
//!     );
//!
//!     guard(MyProvider, submitter).handle(fixtures::create_event()).await?;
//!
//!     let envelope = transport.last_envelope().expect("envelope recorded");
//!     assert_eq!(envelope.status, ResponseStatus::Failed);
//! }
//! ```

pub mod fixtures;
pub mod logs;

/// Mock implementations for testing.
pub mod mocks {
    use custom_resource_core::callback::{CallbackReceipt, CallbackRequest};
    use custom_resource_core::environment::{CallbackTransport, Sleeper};
    use custom_resource_core::error::TransportError;
    use custom_resource_core::response::ResponseEnvelope;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    /// How a [`RecordingTransport`] answers each attempt.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Failures {
        None,
        First(usize),
        Always,
    }

    #[derive(Debug)]
    struct TransportState {
        requests: Vec<CallbackRequest>,
        failures: Failures,
        status: u16,
    }

    /// Callback transport that records every request instead of sending it.
    ///
    /// Clones share state, so keep one clone for assertions and hand the other
    /// to the submitter.
    ///
    /// # Example
    ///
    /// ```
    /// use custom_resource_testing::mocks::RecordingTransport;
    ///
    /// let transport = RecordingTransport::new().failing_first(2);
    /// assert_eq!(transport.attempts(), 0);
    /// ```
    #[derive(Debug, Clone)]
    pub struct RecordingTransport {
        state: Arc<Mutex<TransportState>>,
    }

    impl Default for RecordingTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RecordingTransport {
        /// Transport that answers every attempt with HTTP 200.
        #[must_use]
        pub fn new() -> Self {
            Self {
                state: Arc::new(Mutex::new(TransportState {
                    requests: Vec::new(),
                    failures: Failures::None,
                    status: 200,
                })),
            }
        }

        /// Fail the first `count` attempts with a connection error.
        #[must_use]
        pub fn failing_first(self, count: usize) -> Self {
            self.lock().failures = Failures::First(count);
            self
        }

        /// Fail every attempt with a connection error.
        #[must_use]
        pub fn always_failing(self) -> Self {
            self.lock().failures = Failures::Always;
            self
        }

        /// Answer successful attempts with `status` instead of 200.
        #[must_use]
        pub fn with_status(self, status: u16) -> Self {
            self.lock().status = status;
            self
        }

        /// Every request seen, in order, including failed attempts.
        #[must_use]
        pub fn requests(&self) -> Vec<CallbackRequest> {
            self.lock().requests.clone()
        }

        /// Number of attempts made.
        #[must_use]
        pub fn attempts(&self) -> usize {
            self.lock().requests.len()
        }

        /// Envelopes decoded from the recorded request bodies.
        #[must_use]
        pub fn envelopes(&self) -> Vec<ResponseEnvelope> {
            self.lock()
                .requests
                .iter()
                .filter_map(|request| serde_json::from_str(request.body()).ok())
                .collect()
        }

        /// The most recently sent envelope.
        #[must_use]
        pub fn last_envelope(&self) -> Option<ResponseEnvelope> {
            self.envelopes().pop()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, TransportState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl CallbackTransport for RecordingTransport {
        fn put<'a>(
            &'a self,
            request: &'a CallbackRequest,
        ) -> Pin<Box<dyn Future<Output = Result<CallbackReceipt, TransportError>> + Send + 'a>>
        {
            let outcome = {
                let mut state = self.lock();
                let attempt = state.requests.len();
                state.requests.push(request.clone());
                let fail = match state.failures {
                    Failures::None => false,
                    Failures::First(count) => attempt < count,
                    Failures::Always => true,
                };
                if fail {
                    Err(TransportError::Request(format!(
                        "connection refused (attempt {})",
                        attempt + 1
                    )))
                } else {
                    Ok(CallbackReceipt {
                        status: state.status,
                    })
                }
            };
            Box::pin(async move { outcome })
        }
    }

    /// Sleeper that records requested pauses and returns immediately.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSleeper {
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        /// Create an empty sleeper.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Every pause requested, in order.
        #[must_use]
        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Sum of all requested pauses.
        #[must_use]
        pub fn total(&self) -> Duration {
            self.sleeps().iter().sum()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            self.sleeps
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(duration);
            Box::pin(std::future::ready(()))
        }
    }
}

/// Property-based testing strategies for events.
pub mod properties {
    use crate::fixtures::CALLBACK_URL;
    use custom_resource_core::event::{LifecycleEvent, RequestType};
    use proptest::prelude::*;

    /// Any request type.
    pub fn request_type() -> impl Strategy<Value = RequestType> {
        prop_oneof![
            Just(RequestType::Create),
            Just(RequestType::Update),
            Just(RequestType::Delete),
        ]
    }

    /// Provider-style physical ids. Never equal to either marker.
    pub fn physical_id() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9._-]{0,39}"
    }

    /// Events with arbitrary request type, request id, and optional physical id.
    pub fn lifecycle_event() -> impl Strategy<Value = LifecycleEvent> {
        (
            request_type(),
            "[a-f0-9]{8}-[a-f0-9]{4}",
            proptest::option::of(physical_id()),
        )
            .prop_map(|(request_type, request_id, physical_id)| {
                let event = LifecycleEvent::new(request_type, CALLBACK_URL)
                    .with_stack_id(crate::fixtures::STACK_ID)
                    .with_request_id(request_id)
                    .with_logical_resource_id(crate::fixtures::LOGICAL_RESOURCE_ID);
                match physical_id {
                    Some(id) => event.with_physical_resource_id(id),
                    None => event,
                }
            })
    }
}

// Re-export commonly used items
pub use logs::LogCapture;
pub use mocks::{RecordingSleeper, RecordingTransport};

#[cfg(test)]
mod tests {
    use super::*;
    use custom_resource_core::callback::CallbackRequest;
    use custom_resource_core::environment::{CallbackTransport, Sleeper};
    use custom_resource_core::error::TransportError;
    use std::time::Duration;

    fn request(body: &str) -> CallbackRequest {
        let url = fixtures::CALLBACK_URL.parse().expect("fixture url parses");
        CallbackRequest::new(url, body.to_string())
    }

    #[test]
    fn test_failing_first_then_answers() {
        let transport = RecordingTransport::new().failing_first(1).with_status(204);
        let request = request("{}");

        let first = tokio_test::block_on(transport.put(&request));
        let second = tokio_test::block_on(transport.put(&request));

        assert!(matches!(first, Err(TransportError::Request(_))));
        assert_eq!(second.map(|receipt| receipt.status), Ok(204));
        assert_eq!(transport.attempts(), 2);
    }

    #[test]
    fn test_clones_share_requests() {
        let transport = RecordingTransport::new();
        let clone = transport.clone();

        tokio_test::block_on(clone.put(&request("not json"))).expect("should answer");

        assert_eq!(transport.attempts(), 1);
        // Bodies that are not envelopes are skipped
        assert!(transport.envelopes().is_empty());
    }

    #[test]
    fn test_sleeper_records_without_waiting() {
        let sleeper = RecordingSleeper::new();
        tokio_test::block_on(sleeper.sleep(Duration::from_secs(3600)));
        tokio_test::block_on(sleeper.sleep(Duration::from_secs(1)));
        assert_eq!(sleeper.total(), Duration::from_secs(3601));
    }
}
