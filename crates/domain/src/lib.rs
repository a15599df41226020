//! # Chatwire Domain
//!
//! Data types and error taxonomy for the Chatwire request layer.
//!
//! This crate contains:
//! - Request-side types (`Method`, `Payload`, `MultipartForm`)
//! - Response-side types (`RawResponse`, `Envelope`)
//! - The closed error taxonomy (`ClassifiedError`, `ErrorKind`)
//! - Environment configuration
//!
//! ## Architecture
//! - No dependencies on other Chatwire crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
