//! Handler guard.
//!
//! [`HandlerGuard`] wraps a [`LifecycleAction`] so that every way the action
//! can end maps to a fixed response:
//!
//! | Situation | Guard behaviour |
//! |---|---|
//! | Delete of a resource whose Create failed | action skipped, `SUCCESS` submitted |
//! | Action returns `Ok` | nothing submitted (the action reports success itself) |
//! | Action returns [`HandlerError::Retry`] | nothing submitted, [`GuardError::Retry`] returned |
//! | Action returns [`HandlerError::Failed`] | `FAILED` submitted |
//!
//! Delivery failures are never swallowed; they surface as
//! [`GuardError::Delivery`].
//!
//! # Example
//!
//! ```no_run
//! use custom_resource_core::{LifecycleEvent, ResponderConfig, ResponseStatus, SubmitOptions};
//! use custom_resource_core::error::HandlerError;
//! use custom_resource_runtime::guard::{HandlerGuard, LifecycleAction};
//! use custom_resource_runtime::submitter::ResponseSubmitter;
//! use std::future::Future;
//! use std::pin::Pin;
//!
//! struct BucketProvider;
//!
//! impl LifecycleAction for BucketProvider {
//!     fn run<'a>(
//!         &'a self,
//!         event: &'a mut LifecycleEvent,
//!         responder: &'a ResponseSubmitter,
//!     ) -> Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send + 'a>> {
//!         Box::pin(async move {
//!             event.physical_resource_id = Some("bucket-123".to_string());
//!             responder
//!                 .submit(ResponseStatus::Success, event, SubmitOptions::default())
//!                 .await
//!                 .map_err(HandlerError::failed)?;
//!             Ok(())
//!         })
//!     }
//! }
//!
//! # async fn example(event: LifecycleEvent) -> Result<(), Box<dyn std::error::Error>> {
//! let guard = HandlerGuard::from_config(BucketProvider, &ResponderConfig::from_env()?)?;
//! guard.handle(event).await?;
//! # Ok(())
//! # }
//! ```

use crate::metrics::{ORPHANED_DELETES_TOTAL, RETRIES_REQUESTED_TOTAL};
use crate::submitter::ResponseSubmitter;
use custom_resource_core::config::ResponderConfig;
use custom_resource_core::error::{GuardError, HandlerError, TransportError};
use custom_resource_core::event::{LifecycleEvent, RequestType};
use custom_resource_core::response::{ResponseStatus, SubmitOptions};
use std::future::Future;
use std::pin::Pin;

/// User provisioning logic run by the guard.
///
/// # Success reporting
///
/// The guard reports failures only. When `run` returns `Ok(())` the guard
/// sends nothing, so the action must submit `SUCCESS` itself through the
/// `responder` it is given (typically after setting
/// `event.physical_resource_id` and `event.data`). Returning `Ok(())` without
/// submitting leaves the orchestration engine waiting until its own timeout.
///
/// # Failure reporting
///
/// Return [`HandlerError::Failed`] (any error converts through `anyhow`) to
/// have the guard submit `FAILED`, or [`HandlerError::Retry`] to have the
/// invocation re-run without a response.
pub trait LifecycleAction: Send + Sync {
    /// Provision, update, or remove the resource described by `event`.
    ///
    /// # Errors
    ///
    /// See the trait documentation for how each variant is handled.
    fn run<'a>(
        &'a self,
        event: &'a mut LifecycleEvent,
        responder: &'a ResponseSubmitter,
    ) -> Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send + 'a>>;
}

/// Wraps a [`LifecycleAction`] with failure reporting and orphaned-delete
/// handling.
#[derive(Debug)]
pub struct HandlerGuard<A> {
    action: A,
    submitter: ResponseSubmitter,
    include_stack_traces: bool,
}

/// Guard `action`, reporting through `submitter`, with full diagnostic
/// reasons.
#[must_use]
pub fn guard<A: LifecycleAction>(action: A, submitter: ResponseSubmitter) -> HandlerGuard<A> {
    HandlerGuard::new(action, submitter)
}

impl<A: LifecycleAction> HandlerGuard<A> {
    /// Create a guard. `FAILED` reasons include full diagnostic detail.
    #[must_use]
    pub fn new(action: A, submitter: ResponseSubmitter) -> Self {
        Self {
            action,
            submitter,
            include_stack_traces: true,
        }
    }

    /// Create a guard with a production submitter built from `config`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the HTTP client cannot be built.
    pub fn from_config(action: A, config: &ResponderConfig) -> Result<Self, TransportError> {
        let submitter = ResponseSubmitter::from_config(config)?;
        Ok(Self::new(action, submitter).include_stack_traces(config.include_stack_traces))
    }

    /// Choose between full diagnostic detail and the short message for
    /// `FAILED` reasons.
    #[must_use]
    pub fn include_stack_traces(mut self, include: bool) -> Self {
        self.include_stack_traces = include;
        self
    }

    /// The submitter failures are reported through.
    #[must_use]
    pub const fn submitter(&self) -> &ResponseSubmitter {
        &self.submitter
    }

    /// Run one invocation for `event`.
    ///
    /// # Errors
    ///
    /// - `Retry`: the action asked to be re-invoked; nothing was submitted
    /// - `Delivery`: the response could not be delivered
    #[tracing::instrument(
        skip_all,
        name = "custom_resource_handle",
        fields(request_id = %event.request_id, request_type = %event.request_type)
    )]
    pub async fn handle(&self, mut event: LifecycleEvent) -> Result<(), GuardError> {
        if event.is_orphaned_delete(self.submitter.markers()) {
            tracing::info!(
                request_id = %event.request_id,
                logical_resource_id = %event.logical_resource_id,
                "Ignoring DELETE event caused by a failed CREATE event"
            );
            metrics::counter!(ORPHANED_DELETES_TOTAL).increment(1);
            self.submitter
                .submit(ResponseStatus::Success, &event, SubmitOptions::default())
                .await?;
            return Ok(());
        }

        match self.action.run(&mut event, &self.submitter).await {
            Ok(()) => Ok(()),
            Err(HandlerError::Retry(retry)) => {
                tracing::info!(
                    request_id = %event.request_id,
                    reason = %retry,
                    "Retry requested by handler"
                );
                metrics::counter!(RETRIES_REQUESTED_TOTAL).increment(1);
                Err(GuardError::Retry(retry))
            }
            Err(error) => {
                self.report_failure(&mut event, &error).await?;
                Ok(())
            }
        }
    }

    async fn report_failure(
        &self,
        event: &mut LifecycleEvent,
        error: &HandlerError,
    ) -> Result<(), GuardError> {
        tracing::error!(
            request_id = %event.request_id,
            request_type = %event.request_type,
            error = %error,
            "Lifecycle action failed"
        );

        if event.physical_id().is_none() {
            if event.request_type == RequestType::Create {
                tracing::info!(
                    "CREATE failed, responding with a marker physical resource id so that the subsequent DELETE will be ignored"
                );
                event.physical_resource_id =
                    Some(self.submitter.markers().create_failed().to_string());
            } else {
                tracing::error!(
                    event = %event.redacted_for_log(),
                    "Malformed event: \"PhysicalResourceId\" is required"
                );
            }
        }

        let reason = error.reason(self.include_stack_traces);
        self.submitter
            .submit(ResponseStatus::Failed, event, SubmitOptions::with_reason(reason))
            .await?;
        Ok(())
    }
}
