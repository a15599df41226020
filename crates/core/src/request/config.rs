use std::time::Duration;

use chatwire_domain::{Method, Payload};
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;

/// Caller-supplied adjustments layered over the normalized request.
///
/// Nothing here can change the method or URL of a request.
#[derive(Debug, Clone, Default)]
pub struct RequestOverrides {
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
    /// Extra query pairs; they win over payload-derived pairs with the same key
    pub query: Vec<(String, String)>,
}

impl RequestOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Fully-specified transport configuration for one call.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// Per-call timeout; `None` uses the transport default
    pub timeout: Option<Duration>,
    pub query: Vec<(String, String)>,
    pub body: Option<Payload>,
    /// Observed by the transport to abort the underlying call
    pub cancel: CancellationToken,
}

impl RequestConfig {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
    }
}
