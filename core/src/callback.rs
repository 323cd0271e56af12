//! Callback request shape and URL redaction.
//!
//! Callback URLs are pre-signed: the query string is a bearer credential.
//! Anything written to logs goes through [`redact_url`] first.

use url::Url;

/// Value of the `content-type` header. Callback URLs are signed for an empty
/// content type.
pub const CALLBACK_CONTENT_TYPE: &str = "";

/// Suffix appended to every redacted URL.
pub const REDACTED_QUERY: &str = "?***";

/// A fully prepared callback `PUT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackRequest {
    url: Url,
    body: String,
}

impl CallbackRequest {
    /// Create a request for `url` carrying `body`.
    #[must_use]
    pub const fn new(url: Url, body: String) -> Self {
        Self { url, body }
    }

    /// Target URL, including the signed query string.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Serialized envelope.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Exact UTF-8 byte length of the body.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Headers sent with the request, in order.
    #[must_use]
    pub fn headers(&self) -> [(&'static str, String); 2] {
        [
            ("content-type", CALLBACK_CONTENT_TYPE.to_string()),
            ("content-length", self.content_length().to_string()),
        ]
    }

    /// Log-safe form of the target URL.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        redact_url(&self.url)
    }
}

/// Outcome of a callback attempt that reached the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackReceipt {
    /// HTTP status returned by the endpoint
    pub status: u16,
}

impl CallbackReceipt {
    /// Whether the endpoint answered with a 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Reduce `url` to `scheme://host/path?***`.
///
/// Credentials, port, query, and fragment are dropped. The port is left out
/// on purpose: only the host name identifies the endpoint in logs.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    format!(
        "{}://{}{}{REDACTED_QUERY}",
        url.scheme(),
        url.host_str().unwrap_or_default(),
        url.path()
    )
}
