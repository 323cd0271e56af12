//! Property tests for envelope construction and guard routing.

#![allow(clippy::expect_used)]

use custom_resource_core::config::ResponderConfig;
use custom_resource_core::error::HandlerError;
use custom_resource_core::event::{LifecycleEvent, RequestType};
use custom_resource_core::response::{
    CREATE_FAILED_PHYSICAL_ID_MARKER, MISSING_PHYSICAL_ID_MARKER, PhysicalIdMarkers,
    ResponseEnvelope, ResponseStatus, SubmitOptions,
};
use custom_resource_runtime::{LifecycleAction, ResponseSubmitter, guard};
use custom_resource_testing::properties::{lifecycle_event, physical_id, request_type};
use custom_resource_testing::{RecordingSleeper, RecordingTransport, fixtures};
use proptest::prelude::*;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Always fails with the same message.
struct AlwaysFails;

impl LifecycleAction for AlwaysFails {
    fn run<'a>(
        &'a self,
        _event: &'a mut LifecycleEvent,
        _responder: &'a ResponseSubmitter,
    ) -> Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send + 'a>> {
        Box::pin(async { Err(anyhow::anyhow!("provider exploded").into()) })
    }
}

fn run_guard(event: LifecycleEvent) -> RecordingTransport {
    let transport = RecordingTransport::new();
    let submitter = ResponseSubmitter::new(
        Arc::new(transport.clone()),
        Arc::new(RecordingSleeper::new()),
        &ResponderConfig::default(),
    );
    tokio_test::block_on(guard(AlwaysFails, submitter).handle(event))
        .expect("failure is reported");
    transport
}

proptest! {
    #[test]
    fn envelope_keeps_existing_physical_id(
        event in lifecycle_event(),
        status in prop_oneof![Just(ResponseStatus::Success), Just(ResponseStatus::Failed)],
    ) {
        let envelope = ResponseEnvelope::build(
            status,
            &event,
            &SubmitOptions::default(),
            &PhysicalIdMarkers::default(),
        );

        let expected = event
            .physical_resource_id
            .clone()
            .unwrap_or_else(|| MISSING_PHYSICAL_ID_MARKER.to_string());
        prop_assert_eq!(envelope.physical_resource_id, expected);
        prop_assert_eq!(envelope.reason, status.as_str());
        prop_assert_eq!(envelope.request_id, event.request_id);
    }

    #[test]
    fn failed_create_marker_makes_next_delete_orphaned(request_id in "[a-z0-9]{1,12}") {
        let create = fixtures::create_event().with_request_id(request_id);
        let transport = run_guard(create);
        let answered = transport.last_envelope().expect("create answered");
        prop_assert_eq!(&answered.physical_resource_id, CREATE_FAILED_PHYSICAL_ID_MARKER);

        let delete = fixtures::delete_event(&answered.physical_resource_id);
        prop_assert!(delete.is_orphaned_delete(&PhysicalIdMarkers::default()));
    }

    #[test]
    fn real_ids_are_never_orphaned(kind in request_type(), id in physical_id()) {
        let event = fixtures::update_event(&id);
        let event = LifecycleEvent { request_type: kind, ..event };
        prop_assert!(!event.is_orphaned_delete(&PhysicalIdMarkers::default()));
    }

    #[test]
    fn failure_without_id_gets_a_marker(event in lifecycle_event()) {
        let had_id = event.physical_resource_id.clone();
        let request_type = event.request_type;

        let transport = run_guard(event);
        let answered = transport.last_envelope().expect("failure answered");

        prop_assert_eq!(answered.status, ResponseStatus::Failed);
        let expected = match (had_id, request_type) {
            (Some(id), _) => id,
            (None, RequestType::Create) => CREATE_FAILED_PHYSICAL_ID_MARKER.to_string(),
            (None, _) => MISSING_PHYSICAL_ID_MARKER.to_string(),
        };
        prop_assert_eq!(answered.physical_resource_id, expected);
    }
}
