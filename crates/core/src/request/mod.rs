//! Request construction: overrides, normalization and identity

mod config;
mod identity;
mod normalizer;

pub use config::{RequestConfig, RequestOverrides};
pub use identity::RequestIdentity;
pub use normalizer::{normalize, query_pairs};
