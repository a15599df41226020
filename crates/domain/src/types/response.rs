//! Response-side types: raw transport responses and the business envelope

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::OK_CODE;

/// An HTTP response as handed back by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, content_type: None, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Business envelope every upstream endpoint wraps its payload in.
///
/// `code == 200` denotes business success regardless of the HTTP status.
/// The code is kept as received; only a number equal to 200 is ok, so a
/// string `"200"` or any other present value is a business failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        match self.code.as_i64() {
            Some(code) => code == OK_CODE,
            None => self.code.as_f64().is_some_and(|code| code == OK_CODE as f64),
        }
    }

    /// Pull an envelope out of a JSON object carrying a non-null `code`.
    ///
    /// Anything else is handed back untouched.
    fn extract(mut object: Map<String, Value>) -> Result<Self, Map<String, Value>> {
        if object.get("code").map_or(true, Value::is_null) {
            return Err(object);
        }
        let code = object.remove("code").unwrap_or_default();
        let msg = match object.remove("msg") {
            Some(Value::String(msg)) => Some(msg),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let data = object.remove("data").filter(|value| !value.is_null());
        Ok(Self { code, msg, data })
    }
}

/// A response body after structural parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Envelope(Envelope),
    /// Valid JSON that does not follow the envelope contract
    Plain(Value),
    /// Non-empty text that is not JSON
    Malformed(String),
}

impl ResponseBody {
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => match Envelope::extract(object) {
                Ok(envelope) => Self::Envelope(envelope),
                Err(object) => Self::Plain(Value::Object(object)),
            },
            Ok(other) => Self::Plain(other),
            Err(_) => Self::Malformed(text.to_string()),
        }
    }

    /// Envelope message, when the body carries one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Envelope(envelope) => envelope.msg.as_deref(),
            Self::Plain(Value::Object(object)) => object.get("msg").and_then(Value::as_str),
            _ => None,
        }
    }
}
