//! HTTP transport backed by reqwest

pub mod transport;

pub use transport::{join_url, ReqwestTransport, ReqwestTransportBuilder};
