//! # Chatwire Infrastructure
//!
//! Infrastructure implementations of the core request-layer ports.
//!
//! This crate contains:
//! - The reqwest-backed `Transport`
//! - Environment configuration loading (env vars, `.env`, JSON/TOML files)
//! - Tracing setup and the broadcast `Notifier` for the UI layer
//! - `AppContext`, which wires everything together once at startup
//!
//! ## Architecture
//! - Implements traits defined in `chatwire-core`
//! - Depends on `chatwire-domain` and `chatwire-core`
//! - Contains all "impure" code (network, environment, subscribers)

pub mod config;
pub mod context;
pub mod errors;
pub mod http;
pub mod notify;
pub mod observability;

// Re-export commonly used items
pub use context::AppContext;
pub use http::{ReqwestTransport, ReqwestTransportBuilder};
pub use notify::{BroadcastNotifier, UiEvent};
