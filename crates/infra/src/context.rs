//! Application context
//!
//! Wires the environment config, transport, registry and notifier into a
//! single [`RequestService`] that the rest of the application shares.

use std::sync::Arc;

use chatwire_core::{InFlightRegistry, Notifier, RequestService, Transport};
use chatwire_domain::{EnvironmentConfig, Result};
use tracing::info;

use crate::config;
use crate::http::ReqwestTransport;
use crate::notify::BroadcastNotifier;
use crate::observability;

/// Shared handles for the request layer, built once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<EnvironmentConfig>,
    pub requests: Arc<RequestService>,
    pub events: Arc<BroadcastNotifier>,
    pub registry: Arc<InFlightRegistry>,
}

impl AppContext {
    /// Load configuration, install tracing and build every component.
    ///
    /// # Errors
    /// Returns `ChatwireError::Config` for invalid configuration and
    /// `ChatwireError::Network` if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        let config = config::load()?;
        observability::init_tracing(&config)?;
        Self::with_config(config)
    }

    /// Build every component from an already-resolved configuration.
    ///
    /// Does not touch the global tracing subscriber.
    pub fn with_config(config: EnvironmentConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::from_config(&config)?);
        let registry = Arc::new(InFlightRegistry::new());
        let events = Arc::new(BroadcastNotifier::new());
        let notifier: Arc<dyn Notifier> = events.clone();

        let requests = Arc::new(
            RequestService::new(transport, registry.clone(), notifier)
                .with_production(config.production),
        );

        info!(
            base_url = %config.base_url,
            environment = config.environment_name(),
            "request layer initialised"
        );

        Ok(Self { config: Arc::new(config), requests, events, registry })
    }

    /// Teardown: cancel every in-flight request.
    ///
    /// Returns the number of requests that were cancelled. Each of them
    /// resolves to a cancelled outcome without a user notice.
    pub fn shutdown(&self) -> usize {
        info!("shutdown called on AppContext");
        self.requests.cancel_all_requests()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_config_shares_one_registry() {
        let ctx = AppContext::with_config(EnvironmentConfig::default()).unwrap();

        assert!(Arc::ptr_eq(&ctx.registry, ctx.requests.registry()));
        assert_eq!(ctx.shutdown(), 0);
        assert_eq!(ctx.config.base_url, "http://localhost:8090");
    }
}
