//! Request service - the unified request entry point

use std::sync::Arc;

use chatwire_domain::constants::{
    GENERIC_FAILURE_NOTICE, NOT_FOUND_NOTICE, SESSION_EXPIRED_NOTICE,
};
use chatwire_domain::{CancelReason, ClassifiedError, MultipartForm, Payload};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::classifier::{classify, Outcome};
use crate::ports::{Notice, Notifier, Transport};
use crate::registry::{InFlightHandle, InFlightRegistry};
use crate::request::{normalize, RequestIdentity, RequestOverrides};

/// Dispatches requests with at-most-one in flight per identity.
pub struct RequestService {
    transport: Arc<dyn Transport>,
    registry: Arc<InFlightRegistry>,
    notifier: Arc<dyn Notifier>,
    production: bool,
}

impl RequestService {
    /// Create a new request service
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: Arc<InFlightRegistry>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { transport, registry, notifier, production: false }
    }

    /// Production mode keeps failure diagnostics at debug level.
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn registry(&self) -> &Arc<InFlightRegistry> {
        &self.registry
    }

    /// Send a request and resolve it to the unwrapped business payload.
    ///
    /// A newer call with the same method and path cancels this one, in which
    /// case it resolves to [`ClassifiedError::Cancelled`] without any user
    /// notice. Every other failure is returned to the caller after the
    /// best-effort notice has been raised.
    #[instrument(skip(self, data, overrides), fields(method = %method, url = %url))]
    pub async fn request(
        &self,
        method: &str,
        url: &str,
        data: impl Into<Payload> + Send,
        overrides: RequestOverrides,
    ) -> Result<Value, ClassifiedError> {
        let mut config = normalize(method, url, data.into(), overrides);
        let identity = RequestIdentity::of(&config);
        let guard = InFlightGuard::acquire(&self.registry, identity);
        let ticket = guard.ticket.clone();
        config.cancel = ticket.token().clone();
        debug!(identity = %guard.identity, seq = ticket.seq(), "dispatching request");

        let outcome = tokio::select! {
            biased;
            () = ticket.token().cancelled() => {
                Outcome::Cancelled(ticket.cancel_reason().unwrap_or(CancelReason::Aborted))
            }
            sent = self.transport.send(&config) => match sent {
                Ok(response) => Outcome::Response(response),
                Err(error) => Outcome::Failed(error),
            },
        };

        let identity = guard.settle();

        // Cancellation is authoritative even when the I/O already finished.
        let outcome = match ticket.cancel_reason() {
            Some(reason) => Outcome::Cancelled(reason),
            None => outcome,
        };

        let result = classify(outcome);
        if let Err(error) = &result {
            self.surface(&identity, error);
        }
        result
    }

    /// Like [`request`](Self::request), deserializing the payload into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        data: impl Into<Payload> + Send,
        overrides: RequestOverrides,
    ) -> Result<T, ClassifiedError> {
        let value = self.request(method, url, data, overrides).await?;
        serde_json::from_value(value).map_err(|err| {
            warn!(%url, error = %err, "response payload did not match expected shape");
            ClassifiedError::Decode(err.to_string())
        })
    }

    pub async fn get(
        &self,
        url: &str,
        query: impl Into<Payload> + Send,
    ) -> Result<Value, ClassifiedError> {
        self.request("get", url, query, RequestOverrides::default()).await
    }

    pub async fn post(
        &self,
        url: &str,
        body: impl Into<Payload> + Send,
    ) -> Result<Value, ClassifiedError> {
        self.request("post", url, body, RequestOverrides::default()).await
    }

    pub async fn put(
        &self,
        url: &str,
        body: impl Into<Payload> + Send,
    ) -> Result<Value, ClassifiedError> {
        self.request("put", url, body, RequestOverrides::default()).await
    }

    pub async fn delete(
        &self,
        url: &str,
        body: impl Into<Payload> + Send,
    ) -> Result<Value, ClassifiedError> {
        self.request("delete", url, body, RequestOverrides::default()).await
    }

    /// POST a multipart form (file upload).
    pub async fn upload(&self, url: &str, form: MultipartForm) -> Result<Value, ClassifiedError> {
        self.request("post", url, form, RequestOverrides::default()).await
    }

    /// Teardown hook: abort every in-flight request.
    pub fn cancel_all_requests(&self) -> usize {
        let cancelled = self.registry.cancel_all();
        info!(cancelled, "cancelled all in-flight requests");
        cancelled
    }

    pub fn in_flight(&self) -> usize {
        self.registry.len()
    }

    fn surface(&self, identity: &RequestIdentity, error: &ClassifiedError) {
        if let ClassifiedError::Cancelled { reason } = error {
            debug!(%identity, %reason, "request cancelled");
            return;
        }

        if self.production {
            debug!(%identity, kind = %error.kind(), status = ?error.http_status(), "request failed");
        } else {
            warn!(
                %identity,
                kind = %error.kind(),
                status = ?error.http_status(),
                error = %error,
                "request failed"
            );
        }

        if matches!(error, ClassifiedError::Unauthorized { .. }) {
            self.notifier.session_expired();
        }
        if error.should_notify() {
            self.notifier.notify(notice_for(error));
        }
    }
}

/// Registry entry owned by one dispatch.
///
/// Dropping the guard releases the entry, so a caller that abandons the
/// request future mid-flight does not leave a stale entry behind.
struct InFlightGuard<'a> {
    registry: &'a InFlightRegistry,
    identity: RequestIdentity,
    ticket: InFlightHandle,
    settled: bool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(registry: &'a InFlightRegistry, identity: RequestIdentity) -> Self {
        let ticket = registry.acquire(identity.clone());
        Self { registry, identity, ticket, settled: false }
    }

    /// Release the entry now; returns the identity for surfacing.
    fn settle(mut self) -> RequestIdentity {
        self.settled = true;
        self.identity.clone()
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let released = self.registry.release(&self.identity, &self.ticket);
        if released && !self.settled {
            debug!(identity = %self.identity, seq = self.ticket.seq(), "released abandoned request");
        }
    }
}

fn notice_for(error: &ClassifiedError) -> Notice {
    let message = match error {
        ClassifiedError::NotFound { .. } => NOT_FOUND_NOTICE.to_string(),
        ClassifiedError::Unauthorized { .. } => SESSION_EXPIRED_NOTICE.to_string(),
        other => {
            let message = other.message();
            if message.is_empty() {
                GENERIC_FAILURE_NOTICE.to_string()
            } else {
                message
            }
        }
    };
    Notice { kind: error.kind(), message }
}
