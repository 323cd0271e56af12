//! Metric names and descriptions.
//!
//! Counters are emitted through the `metrics` facade. The library installs no
//! recorder; the embedding application chooses an exporter (or none, in which
//! case every counter is a no-op).
//!
//! # Example
//!
//! ```rust
//! use custom_resource_runtime::metrics::describe_metrics;
//!
//! // After installing a recorder
//! describe_metrics();
//! ```

use metrics::describe_counter;

/// Responses submitted, labelled by `status`.
pub const RESPONSES_TOTAL: &str = "custom_resource_responses_total";
/// Individual callback `PUT` attempts.
pub const DELIVERY_ATTEMPTS_TOTAL: &str = "custom_resource_delivery_attempts_total";
/// Submissions that exhausted every attempt.
pub const DELIVERY_FAILURES_TOTAL: &str = "custom_resource_delivery_failures_total";
/// Deletes answered without running the action.
pub const ORPHANED_DELETES_TOTAL: &str = "custom_resource_orphaned_deletes_total";
/// Invocations that ended with a retry request.
pub const RETRIES_REQUESTED_TOTAL: &str = "custom_resource_retries_requested_total";

/// Register all metric descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(
        RESPONSES_TOTAL,
        "Total number of responses submitted to the orchestration engine"
    );
    describe_counter!(
        DELIVERY_ATTEMPTS_TOTAL,
        "Total number of callback delivery attempts"
    );
    describe_counter!(
        DELIVERY_FAILURES_TOTAL,
        "Total number of responses that could not be delivered"
    );
    describe_counter!(
        ORPHANED_DELETES_TOTAL,
        "Total number of deletes ignored because the create had failed"
    );
    describe_counter!(
        RETRIES_REQUESTED_TOTAL,
        "Total number of invocations that requested a retry"
    );
}
