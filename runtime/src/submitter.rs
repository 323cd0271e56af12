//! Response submission.
//!
//! [`ResponseSubmitter`] turns an event and an outcome into a
//! [`ResponseEnvelope`], logs it with the callback URL redacted, and `PUT`s it
//! to the callback URL with fixed-delay retry. Only the transport call is
//! retried; the envelope is built once.

use crate::metrics::{DELIVERY_ATTEMPTS_TOTAL, DELIVERY_FAILURES_TOTAL, RESPONSES_TOTAL};
use crate::retry::{RetryPolicy, retry_with_fixed_delay};
use crate::transport::{ReqwestTransport, TokioSleeper};
use custom_resource_core::callback::CallbackRequest;
use custom_resource_core::config::ResponderConfig;
use custom_resource_core::environment::{CallbackTransport, Sleeper};
use custom_resource_core::error::{SubmitError, TransportError};
use custom_resource_core::event::LifecycleEvent;
use custom_resource_core::response::{
    PhysicalIdMarkers, ResponseEnvelope, ResponseStatus, SubmitOptions,
};
use std::sync::Arc;
use url::Url;

/// Reports outcomes to the orchestration engine.
///
/// Cheap to clone; clones share the transport and sleeper.
#[derive(Clone)]
pub struct ResponseSubmitter {
    transport: Arc<dyn CallbackTransport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    markers: PhysicalIdMarkers,
}

impl std::fmt::Debug for ResponseSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSubmitter")
            .field("policy", &self.policy)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

impl ResponseSubmitter {
    /// Create a submitter with explicit transport and sleeper.
    ///
    /// Retry policy and markers are taken from `config`.
    #[must_use]
    pub fn new(
        transport: Arc<dyn CallbackTransport>,
        sleeper: Arc<dyn Sleeper>,
        config: &ResponderConfig,
    ) -> Self {
        Self {
            transport,
            sleeper,
            policy: RetryPolicy::new(config.delivery_attempts, config.delivery_delay),
            markers: config.markers.clone(),
        }
    }

    /// Create a production submitter (`reqwest` transport, tokio timer).
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the HTTP client cannot be built.
    pub fn from_config(config: &ResponderConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport), Arc::new(TokioSleeper), config))
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Delivery retry policy.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Physical id markers used when building envelopes.
    #[must_use]
    pub const fn markers(&self) -> &PhysicalIdMarkers {
        &self.markers
    }

    /// Build, log, and deliver the response for `event`.
    ///
    /// Any HTTP response from the endpoint ends delivery; a non-2xx status is
    /// logged as a warning but not retried.
    ///
    /// # Errors
    ///
    /// - `InvalidCallbackUrl`: the event's `ResponseURL` does not parse (no
    ///   attempt is made)
    /// - `Serialization`: the envelope cannot be rendered as JSON
    /// - `Delivery`: every attempt failed; carries the last transport error
    #[tracing::instrument(skip_all, name = "submit_response", fields(status = %status))]
    pub async fn submit(
        &self,
        status: ResponseStatus,
        event: &LifecycleEvent,
        options: SubmitOptions,
    ) -> Result<(), SubmitError> {
        let envelope = ResponseEnvelope::build(status, event, &options, &self.markers);
        let url = Url::parse(&event.response_url)?;
        let request = CallbackRequest::new(url, envelope.to_body()?);

        tracing::info!(
            url = %request.redacted_url(),
            envelope = %request.body(),
            "Submitting response to orchestration engine"
        );
        metrics::counter!(RESPONSES_TOTAL, "status" => status.as_str()).increment(1);

        let transport = self.transport.as_ref();
        let request = &request;
        let receipt = retry_with_fixed_delay(&self.policy, self.sleeper.as_ref(), move || {
            metrics::counter!(DELIVERY_ATTEMPTS_TOTAL).increment(1);
            transport.put(request)
        })
        .await
        .map_err(|source| {
            metrics::counter!(DELIVERY_FAILURES_TOTAL).increment(1);
            SubmitError::Delivery {
                attempts: self.policy.effective_attempts(),
                source,
            }
        })?;

        if !receipt.is_success() {
            tracing::warn!(
                url = %request.redacted_url(),
                http_status = receipt.status,
                "Callback endpoint returned a non-success status"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custom_resource_core::event::RequestType;
    use custom_resource_testing::fixtures::{self, CALLBACK_URL};
    use custom_resource_testing::{RecordingSleeper, RecordingTransport};
    use serde_json::{Map, json};
    use std::time::Duration;

    fn submitter(transport: &RecordingTransport, sleeper: &RecordingSleeper) -> ResponseSubmitter {
        ResponseSubmitter::new(
            Arc::new(transport.clone()),
            Arc::new(sleeper.clone()),
            &ResponderConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_submit_delivers_envelope_with_headers() {
        let transport = RecordingTransport::new();
        let sleeper = RecordingSleeper::new();
        let event = fixtures::update_event("phys-1");

        submitter(&transport, &sleeper)
            .submit(ResponseStatus::Success, &event, SubmitOptions::default())
            .await
            .expect("submit should succeed");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url().as_str(), CALLBACK_URL);
        assert_eq!(requests[0].headers()[0], ("content-type", String::new()));

        let envelope = transport.last_envelope().expect("envelope recorded");
        assert_eq!(envelope.status, ResponseStatus::Success);
        assert_eq!(envelope.reason, "SUCCESS");
        assert_eq!(envelope.physical_resource_id, "phys-1");
        assert_eq!(envelope.request_id, event.request_id);
    }

    #[tokio::test]
    async fn test_content_length_matches_utf8_body() {
        let transport = RecordingTransport::new();
        let sleeper = RecordingSleeper::new();
        let mut data = Map::new();
        data.insert("Greeting".to_string(), json!("こんにちは, Zürich 🚀"));
        let event = fixtures::update_event("phys-1").with_data(data);

        submitter(&transport, &sleeper)
            .submit(ResponseStatus::Success, &event, SubmitOptions::default())
            .await
            .expect("submit should succeed");

        let request = &transport.requests()[0];
        assert!(request.body().len() > request.body().chars().count());
        assert_eq!(
            request.headers()[1],
            ("content-length", request.body().len().to_string())
        );
    }

    #[tokio::test]
    async fn test_four_failures_then_success() {
        let transport = RecordingTransport::new().failing_first(4);
        let sleeper = RecordingSleeper::new();

        submitter(&transport, &sleeper)
            .submit(
                ResponseStatus::Failed,
                &fixtures::update_event("phys-1"),
                SubmitOptions::with_reason("boom"),
            )
            .await
            .expect("fifth attempt should succeed");

        assert_eq!(transport.attempts(), 5);
        assert_eq!(sleeper.total(), Duration::from_millis(4000));
    }

    #[tokio::test]
    async fn test_five_failures_propagate_delivery_error() {
        let transport = RecordingTransport::new().always_failing();
        let sleeper = RecordingSleeper::new();

        let error = submitter(&transport, &sleeper)
            .submit(
                ResponseStatus::Success,
                &fixtures::update_event("phys-1"),
                SubmitOptions::default(),
            )
            .await
            .expect_err("delivery should fail");

        assert!(matches!(
            error,
            SubmitError::Delivery {
                attempts: 5,
                source: TransportError::Request(_)
            }
        ));
        assert_eq!(transport.attempts(), 5);
        assert_eq!(sleeper.sleeps().len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_callback_url_makes_no_attempt() {
        let transport = RecordingTransport::new();
        let sleeper = RecordingSleeper::new();
        let event = LifecycleEvent::new(RequestType::Create, "not a url");

        let error = submitter(&transport, &sleeper)
            .submit(ResponseStatus::Success, &event, SubmitOptions::default())
            .await
            .expect_err("url should be rejected");

        assert!(matches!(error, SubmitError::InvalidCallbackUrl(_)));
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_retried() {
        let transport = RecordingTransport::new().with_status(403);
        let sleeper = RecordingSleeper::new();

        submitter(&transport, &sleeper)
            .submit(
                ResponseStatus::Success,
                &fixtures::update_event("phys-1"),
                SubmitOptions::default(),
            )
            .await
            .expect("any response ends delivery");

        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn test_no_echo_and_reason_are_forwarded() {
        let transport = RecordingTransport::new();
        let sleeper = RecordingSleeper::new();

        submitter(&transport, &sleeper)
            .submit(
                ResponseStatus::Success,
                &fixtures::update_event("phys-1"),
                SubmitOptions::with_reason("created").no_echo(true),
            )
            .await
            .expect("submit should succeed");

        let envelope = transport.last_envelope().expect("envelope recorded");
        assert_eq!(envelope.reason, "created");
        assert_eq!(envelope.no_echo, Some(true));
    }
}
