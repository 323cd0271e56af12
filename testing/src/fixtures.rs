//! Lifecycle event fixtures.
//!
//! All fixtures share one callback URL whose query carries a recognisable
//! signature, so tests can assert it never reaches the logs.

use custom_resource_core::event::{LifecycleEvent, RequestType};

/// Signature embedded in [`CALLBACK_URL`].
pub const CALLBACK_SIGNATURE: &str = "c2VjcmV0LXNpZ25hdHVyZQ";

/// Pre-signed callback URL used by every fixture.
///
/// Already in normalized form, so `Url::parse(CALLBACK_URL).as_str()` is
/// equal to it.
pub const CALLBACK_URL: &str = "https://callback.example.com/stacks/demo/MyResource/req-1?X-Amz-Expires=7200&X-Amz-Signature=c2VjcmV0LXNpZ25hdHVyZQ";

/// Redacted form of [`CALLBACK_URL`].
pub const REDACTED_CALLBACK_URL: &str = "https://callback.example.com/stacks/demo/MyResource/req-1?***";

/// Stack id used by every fixture.
pub const STACK_ID: &str = "arn:aws:cloudformation:us-east-1:123456789012:stack/demo/5b9e0c20";

/// Request id used by every fixture.
pub const REQUEST_ID: &str = "req-1";

/// Logical resource id used by every fixture.
pub const LOGICAL_RESOURCE_ID: &str = "MyResource";

fn base(request_type: RequestType) -> LifecycleEvent {
    let mut event = LifecycleEvent::new(request_type, CALLBACK_URL)
        .with_stack_id(STACK_ID)
        .with_request_id(REQUEST_ID)
        .with_logical_resource_id(LOGICAL_RESOURCE_ID);
    event.resource_type = Some("Custom::Thing".to_string());
    event
}

/// First Create of a resource; no physical id yet.
#[must_use]
pub fn create_event() -> LifecycleEvent {
    base(RequestType::Create)
}

/// Update of the resource identified by `physical_id`.
#[must_use]
pub fn update_event(physical_id: &str) -> LifecycleEvent {
    base(RequestType::Update).with_physical_resource_id(physical_id)
}

/// Delete of the resource identified by `physical_id`.
#[must_use]
pub fn delete_event(physical_id: &str) -> LifecycleEvent {
    base(RequestType::Delete).with_physical_resource_id(physical_id)
}
