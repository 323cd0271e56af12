//! Inbound lifecycle events sent by the orchestration engine.
//!
//! A [`LifecycleEvent`] describes one desired state change of a custom
//! resource. It is consumed once per invocation; the guard may assign
//! [`LifecycleEvent::physical_resource_id`] before the callback is sent and the
//! action may fill in [`LifecycleEvent::data`].
//!
//! Fields use the engine's PascalCase wire names. Fields this crate does not
//! model explicitly are kept in [`LifecycleEvent::extra`] so that an event
//! survives a deserialize/serialize round-trip unchanged.

use crate::response::PhysicalIdMarkers;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Placeholder written over the callback URL in diagnostic output.
pub const REDACTED_RESPONSE_URL: &str = "...";

/// The kind of change requested for a custom resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// Resource is being created
    Create,
    /// Resource properties changed
    Update,
    /// Resource is being removed
    Delete,
}

impl RequestType {
    /// Wire name of the request type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One notification from the orchestration engine about a custom resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    /// Requested change
    pub request_type: RequestType,

    /// Stack the resource belongs to
    pub stack_id: String,

    /// Unique id of this request, echoed back in the response
    pub request_id: String,

    /// Template-level name of the resource
    pub logical_resource_id: String,

    /// Provider-assigned id; absent on the first Create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,

    /// One-time, pre-signed callback endpoint. Never log this in full.
    #[serde(rename = "ResponseURL")]
    pub response_url: String,

    /// Custom resource type name (e.g. `Custom::Bucket`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Properties declared in the template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_properties: Option<Value>,

    /// Previous properties, present on Update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Value>,

    /// Identifier of the function servicing the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,

    /// Output attributes returned to the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,

    /// Any other fields sent by the engine
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LifecycleEvent {
    /// Create an event with the given request type and callback URL.
    ///
    /// Identifier fields start empty; fill them with the `with_*` methods.
    #[must_use]
    pub fn new(request_type: RequestType, response_url: impl Into<String>) -> Self {
        Self {
            request_type,
            stack_id: String::new(),
            request_id: String::new(),
            logical_resource_id: String::new(),
            physical_resource_id: None,
            response_url: response_url.into(),
            resource_type: None,
            resource_properties: None,
            old_resource_properties: None,
            service_token: None,
            data: None,
            extra: Map::new(),
        }
    }

    /// Set the stack id.
    #[must_use]
    pub fn with_stack_id(mut self, stack_id: impl Into<String>) -> Self {
        self.stack_id = stack_id.into();
        self
    }

    /// Set the request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Set the logical resource id.
    #[must_use]
    pub fn with_logical_resource_id(mut self, logical_resource_id: impl Into<String>) -> Self {
        self.logical_resource_id = logical_resource_id.into();
        self
    }

    /// Set the physical resource id.
    #[must_use]
    pub fn with_physical_resource_id(mut self, physical_resource_id: impl Into<String>) -> Self {
        self.physical_resource_id = Some(physical_resource_id.into());
        self
    }

    /// Set the output attributes.
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// The physical resource id, treating an empty string as absent.
    #[must_use]
    pub fn physical_id(&self) -> Option<&str> {
        self.physical_resource_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    /// Whether this is a Delete for a resource whose Create failed before a
    /// real physical id was assigned.
    ///
    /// Compares against the create-failed marker by exact equality.
    #[must_use]
    pub fn is_orphaned_delete(&self, markers: &PhysicalIdMarkers) -> bool {
        self.request_type == RequestType::Delete
            && self.physical_resource_id.as_deref() == Some(markers.create_failed())
    }

    /// JSON rendering of the event with the callback URL masked.
    #[must_use]
    pub fn redacted_for_log(&self) -> String {
        let mut redacted = self.clone();
        redacted.response_url = REDACTED_RESPONSE_URL.to_string();
        serde_json::to_string(&redacted)
            .unwrap_or_else(|e| format!("<unserializable event: {e}>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::CREATE_FAILED_PHYSICAL_ID_MARKER;
    use serde_json::json;

    fn engine_payload() -> Value {
        json!({
            "RequestType": "Update",
            "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:provider",
            "ResponseURL": "https://cloudformation-custom-resource-response.s3.amazonaws.com/stack/resource?X-Amz-Signature=abc",
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/demo/guid",
            "RequestId": "req-1",
            "LogicalResourceId": "MyResource",
            "PhysicalResourceId": "phys-1",
            "ResourceType": "Custom::Thing",
            "ResourceProperties": { "Size": "3" },
            "OldResourceProperties": { "Size": "2" },
            "ResourceTypeVersion": "2"
        })
    }

    #[test]
    fn test_deserializes_engine_payload() {
        let event: LifecycleEvent =
            serde_json::from_value(engine_payload()).expect("payload should parse");

        assert_eq!(event.request_type, RequestType::Update);
        assert_eq!(event.request_id, "req-1");
        assert_eq!(event.physical_id(), Some("phys-1"));
        assert_eq!(event.resource_type.as_deref(), Some("Custom::Thing"));
        assert_eq!(event.extra.get("ResourceTypeVersion"), Some(&json!("2")));
        assert!(event.data.is_none());
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let payload = engine_payload();
        let event: LifecycleEvent =
            serde_json::from_value(payload.clone()).expect("payload should parse");

        let back = serde_json::to_value(&event).expect("event should serialize");
        assert_eq!(back, payload);
    }

    #[test]
    fn test_missing_physical_id_on_create() {
        let event: LifecycleEvent = serde_json::from_value(json!({
            "RequestType": "Create",
            "ResponseURL": "https://example.com/cb",
            "StackId": "stack",
            "RequestId": "req",
            "LogicalResourceId": "Res"
        }))
        .expect("payload should parse");

        assert!(event.physical_resource_id.is_none());
        assert!(event.physical_id().is_none());
    }

    #[test]
    fn test_empty_physical_id_counts_as_absent() {
        let event = LifecycleEvent::new(RequestType::Update, "https://example.com/cb")
            .with_physical_resource_id("");
        assert!(event.physical_id().is_none());
    }

    #[test]
    fn test_orphaned_delete_requires_exact_marker() {
        let markers = PhysicalIdMarkers::default();
        let orphan = LifecycleEvent::new(RequestType::Delete, "https://example.com/cb")
            .with_physical_resource_id(CREATE_FAILED_PHYSICAL_ID_MARKER);
        assert!(orphan.is_orphaned_delete(&markers));

        let lookalike = LifecycleEvent::new(RequestType::Delete, "https://example.com/cb")
            .with_physical_resource_id(format!("{CREATE_FAILED_PHYSICAL_ID_MARKER} "));
        assert!(!lookalike.is_orphaned_delete(&markers));

        let update = LifecycleEvent::new(RequestType::Update, "https://example.com/cb")
            .with_physical_resource_id(CREATE_FAILED_PHYSICAL_ID_MARKER);
        assert!(!update.is_orphaned_delete(&markers));
    }

    #[test]
    fn test_redacted_for_log_masks_callback_url() {
        let event: LifecycleEvent =
            serde_json::from_value(engine_payload()).expect("payload should parse");

        let rendered = event.redacted_for_log();
        assert!(!rendered.contains("X-Amz-Signature"));
        assert!(rendered.contains(r#""ResponseURL":"...""#));
        assert!(rendered.contains("MyResource"));
        // The event itself is left untouched
        assert!(event.response_url.contains("X-Amz-Signature"));
    }

    #[test]
    fn test_request_type_display() {
        assert_eq!(RequestType::Create.to_string(), "Create");
        assert_eq!(RequestType::Delete.as_str(), "Delete");
    }
}
