//! Production implementations of the environment traits.
//!
//! - [`ReqwestTransport`]: sends the callback `PUT` with `reqwest`
//! - [`TokioSleeper`]: pauses with `tokio::time::sleep`

use custom_resource_core::callback::{CALLBACK_CONTENT_TYPE, CallbackReceipt, CallbackRequest};
use custom_resource_core::config::ResponderConfig;
use custom_resource_core::environment::{CallbackTransport, Sleeper};
use custom_resource_core::error::TransportError;
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Callback transport backed by a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with a per-request timeout.
    ///
    /// Redirects are not followed: a pre-signed URL answers directly.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// Create a transport using the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the HTTP client cannot be built.
    pub fn from_config(config: &ResponderConfig) -> Result<Self, TransportError> {
        Self::new(config.request_timeout)
    }

    /// Wrap an existing client. `timeout` is only used for error reporting.
    #[must_use]
    pub const fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn classify(&self, error: reqwest::Error) -> TransportError {
        // reqwest renders the full URL, signature included, unless told otherwise
        let error = error.without_url();
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

impl CallbackTransport for ReqwestTransport {
    fn put<'a>(
        &'a self,
        request: &'a CallbackRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CallbackReceipt, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .put(request.url().clone())
                .header(CONTENT_TYPE, CALLBACK_CONTENT_TYPE)
                .header(CONTENT_LENGTH, request.content_length())
                .body(request.body().to_owned())
                .send()
                .await
                .map_err(|e| self.classify(e))?;

            Ok(CallbackReceipt {
                status: response.status().as_u16(),
            })
        })
    }
}

/// Sleeper backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(duration))
    }
}
