//! Infrastructure error handling
//!
//! Conversions from third-party errors into the domain's error types.

pub mod conversions;

pub use conversions::{InfraError, IntoTransportError};
