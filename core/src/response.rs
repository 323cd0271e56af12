//! The response envelope delivered to the callback URL.
//!
//! An envelope is built fresh for every submission from the event and the
//! outcome, serialized once, and never mutated afterwards.

use crate::event::LifecycleEvent;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Physical id reported when a Create failed before a real id was assigned.
///
/// A later Delete carrying this id is answered without running delete logic.
pub const CREATE_FAILED_PHYSICAL_ID_MARKER: &str =
    "AWSCDK::CustomResourceProviderFramework::CREATE_FAILED";

/// Physical id reported when the event never carried one.
pub const MISSING_PHYSICAL_ID_MARKER: &str =
    "AWSCDK::CustomResourceProviderFramework::MISSING_PHYSICAL_ID";

/// Outcome reported to the orchestration engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    /// The operation completed
    Success,
    /// The operation failed
    Failed,
}

impl ResponseStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two physical id markers, carried as immutable configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalIdMarkers {
    create_failed: String,
    missing: String,
}

impl PhysicalIdMarkers {
    /// Create a marker set with custom values.
    #[must_use]
    pub fn new(create_failed: impl Into<String>, missing: impl Into<String>) -> Self {
        Self {
            create_failed: create_failed.into(),
            missing: missing.into(),
        }
    }

    /// Marker meaning "create failed before a physical id was assigned".
    #[must_use]
    pub fn create_failed(&self) -> &str {
        &self.create_failed
    }

    /// Marker meaning "the handler never supplied a physical id".
    #[must_use]
    pub fn missing(&self) -> &str {
        &self.missing
    }
}

impl Default for PhysicalIdMarkers {
    fn default() -> Self {
        Self::new(CREATE_FAILED_PHYSICAL_ID_MARKER, MISSING_PHYSICAL_ID_MARKER)
    }
}

/// Optional knobs for a single submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Human-readable reason; defaults to the status string
    pub reason: Option<String>,
    /// Ask the engine to mask `Data` values in its console and API output
    pub no_echo: Option<bool>,
}

impl SubmitOptions {
    /// Options carrying a reason.
    #[must_use]
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            no_echo: None,
        }
    }

    /// Set the `NoEcho` flag.
    #[must_use]
    pub const fn no_echo(mut self, no_echo: bool) -> Self {
        self.no_echo = Some(no_echo);
        self
    }
}

/// Wire payload sent back to the orchestration engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseEnvelope {
    /// Outcome
    pub status: ResponseStatus,
    /// Reason shown to the operator
    pub reason: String,
    /// Echoed from the event
    pub stack_id: String,
    /// Echoed from the event
    pub request_id: String,
    /// Resolved physical id, never empty
    pub physical_resource_id: String,
    /// Echoed from the event
    pub logical_resource_id: String,
    /// Mask `Data` in engine output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_echo: Option<bool>,
    /// Output attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl ResponseEnvelope {
    /// Build the envelope for `event` with the given outcome.
    ///
    /// `Reason` falls back to the status string when no non-empty reason is
    /// given; `PhysicalResourceId` falls back to the missing-id marker.
    #[must_use]
    pub fn build(
        status: ResponseStatus,
        event: &LifecycleEvent,
        options: &SubmitOptions,
        markers: &PhysicalIdMarkers,
    ) -> Self {
        let reason = options
            .reason
            .as_deref()
            .filter(|reason| !reason.is_empty())
            .unwrap_or(status.as_str())
            .to_string();

        let physical_resource_id = event
            .physical_id()
            .unwrap_or(markers.missing())
            .to_string();

        Self {
            status,
            reason,
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            physical_resource_id,
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: options.no_echo,
            data: event.data.clone(),
        }
    }

    /// Serialize to the JSON body sent on the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if a `Data` value cannot be represented as JSON.
    pub fn to_body(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RequestType;
    use serde_json::json;

    fn event() -> LifecycleEvent {
        LifecycleEvent::new(RequestType::Update, "https://example.com/cb?sig=1")
            .with_stack_id("stack-1")
            .with_request_id("req-1")
            .with_logical_resource_id("Res")
    }

    #[test]
    fn test_reason_defaults_to_status() {
        let markers = PhysicalIdMarkers::default();
        for status in [ResponseStatus::Success, ResponseStatus::Failed] {
            let envelope =
                ResponseEnvelope::build(status, &event(), &SubmitOptions::default(), &markers);
            assert_eq!(envelope.reason, status.as_str());
        }
    }

    #[test]
    fn test_explicit_reason_is_kept() {
        let envelope = ResponseEnvelope::build(
            ResponseStatus::Failed,
            &event(),
            &SubmitOptions::with_reason("bucket already exists"),
            &PhysicalIdMarkers::default(),
        );
        assert_eq!(envelope.reason, "bucket already exists");
    }

    #[test]
    fn test_missing_physical_id_uses_marker() {
        let envelope = ResponseEnvelope::build(
            ResponseStatus::Success,
            &event(),
            &SubmitOptions::default(),
            &PhysicalIdMarkers::default(),
        );
        assert_eq!(envelope.physical_resource_id, MISSING_PHYSICAL_ID_MARKER);
    }

    #[test]
    fn test_custom_markers_are_honoured() {
        let markers = PhysicalIdMarkers::new("test::CREATE_FAILED", "test::MISSING");
        let envelope = ResponseEnvelope::build(
            ResponseStatus::Success,
            &event(),
            &SubmitOptions::default(),
            &markers,
        );
        assert_eq!(envelope.physical_resource_id, "test::MISSING");
    }

    #[test]
    fn test_wire_format() {
        let mut data = Map::new();
        data.insert("Arn".to_string(), json!("arn:thing"));
        let event = event().with_physical_resource_id("phys-1").with_data(data);

        let envelope = ResponseEnvelope::build(
            ResponseStatus::Success,
            &event,
            &SubmitOptions::default().no_echo(true),
            &PhysicalIdMarkers::default(),
        );
        let body: Value =
            serde_json::from_str(&envelope.to_body().expect("should serialize")).expect("json");

        assert_eq!(
            body,
            json!({
                "Status": "SUCCESS",
                "Reason": "SUCCESS",
                "StackId": "stack-1",
                "RequestId": "req-1",
                "PhysicalResourceId": "phys-1",
                "LogicalResourceId": "Res",
                "NoEcho": true,
                "Data": { "Arn": "arn:thing" }
            })
        );
    }

    #[test]
    fn test_unset_optionals_are_omitted() {
        let envelope = ResponseEnvelope::build(
            ResponseStatus::Failed,
            &event(),
            &SubmitOptions::default(),
            &PhysicalIdMarkers::default(),
        );
        let body = envelope.to_body().expect("should serialize");
        assert!(!body.contains("NoEcho"));
        assert!(!body.contains("Data"));
    }
}
