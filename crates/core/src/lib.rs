//! # Chatwire Core
//!
//! Pure request-layer logic - no network code.
//!
//! This crate contains:
//! - The request normalizer and request identity
//! - The in-flight registry that enforces one live request per identity
//! - The response/error classifier
//! - Port interfaces (`Transport`, `Notifier`) and the `RequestService`
//!   that ties them together
//!
//! ## Architecture Principles
//! - Only depends on `chatwire-domain`
//! - No HTTP client code; I/O happens behind the `Transport` port
//! - Pure, testable business logic

pub mod classifier;
pub mod ports;
pub mod registry;
pub mod request;
pub mod service;
pub mod utils;

// Re-export specific items to avoid ambiguity
pub use classifier::{classify, Outcome};
pub use ports::{Notice, Notifier, SilentNotifier, Transport};
pub use registry::{InFlightHandle, InFlightRegistry};
pub use request::{normalize, RequestConfig, RequestIdentity, RequestOverrides};
pub use service::RequestService;
pub use utils::throttle::Throttle;
