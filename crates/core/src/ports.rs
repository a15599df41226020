//! Port interfaces for the request layer
//!
//! These traits define the boundaries between the core request logic and
//! the infrastructure that performs I/O or talks to the UI.

use async_trait::async_trait;
use chatwire_domain::{ErrorKind, RawResponse, TransportError};

use crate::request::RequestConfig;

/// Executes one HTTP call.
///
/// Implementations should watch `config.cancel` and abort the underlying
/// call when it fires. The service suppresses a cancelled request's outcome
/// either way.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request; any received HTTP response (2xx or not) is `Ok`.
    async fn send(&self, config: &RequestConfig) -> Result<RawResponse, TransportError>;
}

/// Best-effort user-facing message for a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: String,
}

/// Side channel to the UI layer.
pub trait Notifier: Send + Sync {
    /// Show a transient notice (toast).
    fn notify(&self, notice: Notice);

    /// Signal that the session is no longer valid. The UI decides whether to
    /// offer a redirect to the login view.
    fn session_expired(&self);
}

/// Notifier that drops everything; useful for headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notice: Notice) {}

    fn session_expired(&self) {}
}
