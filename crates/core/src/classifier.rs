//! Response/error classifier
//!
//! Maps every request [`Outcome`] onto either the unwrapped business payload
//! or a [`ClassifiedError`].
//!
//! Malformed-but-present bodies are returned as raw text with a warning
//! instead of failing. That leniency is a deliberate policy that may hide
//! backend faults; see DESIGN.md before changing it.

use chatwire_domain::constants::DEFAULT_BUSINESS_ERROR_MSG;
use chatwire_domain::{
    CancelReason, ClassifiedError, ErrorKind, RawResponse, ResponseBody, TransportError,
};
use serde_json::Value;
use tracing::warn;

/// What came back from dispatching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Response(RawResponse),
    Failed(TransportError),
    Cancelled(CancelReason),
}

/// Interpret an outcome.
pub fn classify(outcome: Outcome) -> Result<Value, ClassifiedError> {
    match outcome {
        Outcome::Cancelled(reason) => Err(ClassifiedError::Cancelled { reason }),
        Outcome::Failed(error) => Err(classify_transport(error)),
        Outcome::Response(response) if response.is_success() => unwrap_success(&response),
        Outcome::Response(response) => Err(classify_status(&response)),
    }
}

fn classify_transport(error: TransportError) -> ClassifiedError {
    match error {
        TransportError::Timeout(message) => ClassifiedError::Timeout { message },
        TransportError::Connection(message) | TransportError::Invalid(message) => {
            ClassifiedError::ConnectionError { message }
        }
        TransportError::Aborted(_) => ClassifiedError::Cancelled { reason: CancelReason::Aborted },
    }
}

fn unwrap_success(response: &RawResponse) -> Result<Value, ClassifiedError> {
    match ResponseBody::parse(&response.body) {
        ResponseBody::Empty => Ok(Value::Null),
        ResponseBody::Envelope(envelope) if envelope.is_ok() => {
            Ok(envelope.data.unwrap_or(Value::Null))
        }
        ResponseBody::Envelope(envelope) => Err(ClassifiedError::BusinessError {
            code: envelope.code,
            message: envelope.msg.unwrap_or_else(|| DEFAULT_BUSINESS_ERROR_MSG.to_string()),
            data: envelope.data,
        }),
        ResponseBody::Plain(value) => Ok(value),
        ResponseBody::Malformed(raw) => {
            warn!(
                kind = %ErrorKind::MalformedResponse,
                status = response.status,
                content_type = response.content_type.as_deref().unwrap_or("unknown"),
                "response body is not valid JSON; returning raw text"
            );
            Ok(Value::String(raw))
        }
    }
}

fn classify_status(response: &RawResponse) -> ClassifiedError {
    let message = ResponseBody::parse(&response.body)
        .message()
        .map_or_else(|| status_text(response.status), str::to_string);

    match response.status {
        401 => ClassifiedError::Unauthorized { message },
        403 => ClassifiedError::Forbidden { message },
        404 => ClassifiedError::NotFound { message },
        500 => ClassifiedError::ServerError { message },
        status => ClassifiedError::OtherHttpError { status, message },
    }
}

fn status_text(status: u16) -> String {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| format!("HTTP status {status}"), str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(status: u16, body: &str) -> Outcome {
        Outcome::Response(RawResponse::new(status, body))
    }

    #[test]
    fn ok_envelope_unwraps_data() {
        let result = classify(response(200, r#"{"code":200,"data":{"x":1}}"#));
        assert_eq!(result.unwrap(), json!({"x": 1}));
    }

    #[test]
    fn ok_envelope_without_data_is_null() {
        let result = classify(response(200, r#"{"code":200,"msg":"saved"}"#));
        assert_eq!(result.unwrap(), Value::Null);
    }

    #[test]
    fn business_failure_under_http_200() {
        let err = classify(response(200, r#"{"code":500,"msg":"invalid"}"#)).unwrap_err();
        assert_eq!(
            err,
            ClassifiedError::BusinessError {
                code: json!(500),
                message: "invalid".into(),
                data: None
            }
        );
    }

    #[test]
    fn non_integer_business_codes_still_fail() {
        let err = classify(response(200, r#"{"code":"500","msg":"invalid"}"#)).unwrap_err();
        assert_eq!(
            err,
            ClassifiedError::BusinessError {
                code: json!("500"),
                message: "invalid".into(),
                data: None
            }
        );

        let err = classify(response(200, r#"{"code":500.0,"msg":"invalid"}"#)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BusinessError);

        // A quoted "200" is not the ok value.
        let err = classify(response(200, r#"{"code":"200","data":{"x":1}}"#)).unwrap_err();
        assert_eq!(err.message(), DEFAULT_BUSINESS_ERROR_MSG);
    }

    #[test]
    fn float_ok_code_unwraps_data() {
        let result = classify(response(200, r#"{"code":200.0,"data":{"x":1}}"#));
        assert_eq!(result.unwrap(), json!({"x": 1}));
    }

    #[test]
    fn business_failure_without_message_uses_default() {
        let err = classify(response(200, r#"{"code":1001}"#)).unwrap_err();
        assert_eq!(err.message(), DEFAULT_BUSINESS_ERROR_MSG);
        assert_eq!(err.kind(), ErrorKind::BusinessError);
    }

    #[test]
    fn non_envelope_json_is_returned_whole() {
        let result = classify(response(200, r#"[{"id":1}]"#));
        assert_eq!(result.unwrap(), json!([{"id": 1}]));
    }

    #[test]
    fn malformed_body_returns_raw_text() {
        let result = classify(response(200, "not json"));
        assert_eq!(result.unwrap(), Value::String("not json".into()));
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(classify(response(204, "")).unwrap(), Value::Null);
    }

    #[test]
    fn http_statuses_map_to_taxonomy() {
        assert!(matches!(
            classify(response(401, "")).unwrap_err(),
            ClassifiedError::Unauthorized { .. }
        ));
        assert!(matches!(
            classify(response(403, "")).unwrap_err(),
            ClassifiedError::Forbidden { .. }
        ));
        assert!(matches!(
            classify(response(404, "")).unwrap_err(),
            ClassifiedError::NotFound { .. }
        ));
        assert!(matches!(
            classify(response(500, "")).unwrap_err(),
            ClassifiedError::ServerError { .. }
        ));
        assert_eq!(
            classify(response(502, "")).unwrap_err(),
            ClassifiedError::OtherHttpError { status: 502, message: "Bad Gateway".into() }
        );
    }

    #[test]
    fn error_body_message_is_preferred() {
        let err = classify(response(500, r#"{"code":500,"msg":"db down"}"#)).unwrap_err();
        assert_eq!(err, ClassifiedError::ServerError { message: "db down".into() });
    }

    #[test]
    fn unknown_status_text() {
        let err = classify(response(599, "")).unwrap_err();
        assert_eq!(err.message(), "HTTP status 599");
    }

    #[test]
    fn transport_failures() {
        let err = classify(Outcome::Failed(TransportError::Timeout("3000ms".into()))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);

        let err =
            classify(Outcome::Failed(TransportError::Connection("refused".into()))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionError);

        let err = classify(Outcome::Failed(TransportError::Invalid("bad url".into()))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionError);

        let err = classify(Outcome::Failed(TransportError::Aborted("dropped".into()))).unwrap_err();
        assert_eq!(err, ClassifiedError::Cancelled { reason: CancelReason::Aborted });
    }

    #[test]
    fn cancelled_outcome() {
        let err = classify(Outcome::Cancelled(CancelReason::Superseded)).unwrap_err();
        assert!(err.is_cancelled());
    }
}
