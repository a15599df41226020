//! Error types used throughout the request layer
//!
//! Three layers of errors live here:
//! - [`ChatwireError`] for setup failures (configuration, client construction)
//! - [`TransportError`] for calls that never produced an HTTP response
//! - [`ClassifiedError`] for the closed taxonomy every request resolves into

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Setup-time error type for Chatwire
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ChatwireError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Chatwire setup operations
pub type Result<T> = std::result::Result<T, ChatwireError>;

/// Why an in-flight request was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// A newer request with the same identity was dispatched
    Superseded,
    /// The hosting application is tearing down
    Teardown,
    /// The transport aborted the call on its own
    Aborted,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Superseded => write!(f, "superseded by newer request"),
            Self::Teardown => write!(f, "cancelled by application teardown"),
            Self::Aborted => write!(f, "aborted by transport"),
        }
    }
}

/// A request that never received an HTTP response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("timeout: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    /// The request could not be built (bad URL, unencodable body)
    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("aborted: {0}")]
    Aborted(String),
}

/// Closed set of outcome kinds, used for notices and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Cancelled,
    Timeout,
    ConnectionError,
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
    OtherHttpError,
    BusinessError,
    /// Non-fatal: the raw payload is returned with a warning
    MalformedResponse,
    Decode,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Timeout => "timeout",
            Self::ConnectionError => "connection_error",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::ServerError => "server_error",
            Self::OtherHttpError => "other_http_error",
            Self::BusinessError => "business_error",
            Self::MalformedResponse => "malformed_response",
            Self::Decode => "decode",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every non-success request outcome, classified.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifiedError {
    /// Expected control flow; never surfaced to the user
    #[error("request cancelled: {reason}")]
    Cancelled { reason: CancelReason },

    #[error("request timed out: {message}")]
    Timeout { message: String },

    #[error("connection error: {message}")]
    ConnectionError { message: String },

    #[error("unauthorized (401): {message}")]
    Unauthorized { message: String },

    #[error("forbidden (403): {message}")]
    Forbidden { message: String },

    #[error("not found (404): {message}")]
    NotFound { message: String },

    #[error("server error (500): {message}")]
    ServerError { message: String },

    #[error("HTTP {status}: {message}")]
    OtherHttpError { status: u16, message: String },

    /// HTTP succeeded but the envelope `code` was not the ok sentinel.
    /// `code` is kept as received, which may be a string or a float.
    #[error("business error {code}: {message}")]
    BusinessError { code: Value, message: String, data: Option<Value> },

    /// The unwrapped payload did not match the caller's expected type
    #[error("failed to decode response payload: {0}")]
    Decode(String),
}

impl ClassifiedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ConnectionError { .. } => ErrorKind::ConnectionError,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ServerError { .. } => ErrorKind::ServerError,
            Self::OtherHttpError { .. } => ErrorKind::OtherHttpError,
            Self::BusinessError { .. } => ErrorKind::BusinessError,
            Self::Decode(_) => ErrorKind::Decode,
        }
    }

    /// HTTP status that produced this error, when one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::ServerError { .. } => Some(500),
            Self::OtherHttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether the request layer should raise a best-effort user notice.
    pub fn should_notify(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound
                | ErrorKind::ServerError
                | ErrorKind::Unauthorized
                | ErrorKind::ConnectionError
                | ErrorKind::Timeout
        )
    }

    /// Human-readable message without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Cancelled { reason } => reason.to_string(),
            Self::Timeout { message }
            | Self::ConnectionError { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::ServerError { message }
            | Self::OtherHttpError { message, .. }
            | Self::BusinessError { message, .. } => message.clone(),
            Self::Decode(message) => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_statuses_follow_variant() {
        let err = ClassifiedError::OtherHttpError { status: 418, message: "teapot".into() };
        assert_eq!(err.http_status(), Some(418));
        assert_eq!(err.kind(), ErrorKind::OtherHttpError);

        let err = ClassifiedError::Timeout { message: "slow".into() };
        assert_eq!(err.http_status(), None);
    }

    #[test]
    fn cancelled_is_never_notified() {
        let err = ClassifiedError::Cancelled { reason: CancelReason::Superseded };
        assert!(err.is_cancelled());
        assert!(!err.should_notify());
        assert_eq!(err.message(), "superseded by newer request");
    }

    #[test]
    fn notified_kinds() {
        let notified = [
            ClassifiedError::NotFound { message: String::new() },
            ClassifiedError::ServerError { message: String::new() },
            ClassifiedError::Unauthorized { message: String::new() },
            ClassifiedError::ConnectionError { message: String::new() },
            ClassifiedError::Timeout { message: String::new() },
        ];
        assert!(notified.iter().all(ClassifiedError::should_notify));

        let silent = [
            ClassifiedError::Forbidden { message: String::new() },
            ClassifiedError::OtherHttpError { status: 502, message: String::new() },
            ClassifiedError::BusinessError {
                code: Value::from(500),
                message: String::new(),
                data: None,
            },
        ];
        assert!(!silent.iter().any(ClassifiedError::should_notify));
    }

    #[test]
    fn business_error_display_carries_code_and_message() {
        let err = ClassifiedError::BusinessError {
            code: Value::from(501),
            message: "invalid".into(),
            data: None,
        };
        assert_eq!(err.to_string(), "business error 501: invalid");

        let err = ClassifiedError::BusinessError {
            code: Value::from("E42"),
            message: "invalid".into(),
            data: None,
        };
        assert_eq!(err.to_string(), "business error \"E42\": invalid");
    }

    #[test]
    fn setup_errors_serialize_tagged() {
        let json = serde_json::to_value(ChatwireError::Config("bad timeout".into())).unwrap();
        assert_eq!(json["type"], "Config");
        assert_eq!(json["message"], "bad timeout");
    }
}
