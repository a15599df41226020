//! Domain types and models

pub mod request;
pub mod response;

pub use request::{FormPart, FormPartBody, Method, MultipartForm, Payload};
pub use response::{Envelope, RawResponse, ResponseBody};
