//! Conversions from external infrastructure errors into domain errors.

use chatwire_domain::{ChatwireError, TransportError};
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ChatwireError);

impl From<InfraError> for ChatwireError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ChatwireError> for InfraError {
    fn from(value: ChatwireError) -> Self {
        InfraError(value)
    }
}

/// Maps a failed call onto the transport-level error the classifier expects.
pub trait IntoTransportError {
    fn into_transport(self) -> TransportError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

impl IntoTransportError for HttpError {
    fn into_transport(self) -> TransportError {
        let message = describe(&self);

        if self.is_timeout() {
            return TransportError::Timeout(message);
        }

        if self.is_builder() {
            return TransportError::Invalid(message);
        }

        if self.is_connect() || self.is_request() {
            return TransportError::Connection(message);
        }

        // Body and decode failures still mean no usable response arrived
        TransportError::Connection(message)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ChatwireError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        if value.is_builder() {
            return InfraError(ChatwireError::Config(format!(
                "invalid HTTP client configuration: {}",
                describe(&value)
            )));
        }
        InfraError(ChatwireError::Network(describe(&value)))
    }
}

/// Render the error with its source chain; reqwest's top-level message alone
/// rarely names the cause.
fn describe(err: &HttpError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn connection_refused_maps_to_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reqwest::Client::new()
            .get(format!("http://{}", addr))
            .send()
            .await
            .expect_err("port should be closed");

        assert!(matches!(err.into_transport(), TransportError::Connection(_)));
    }

    #[tokio::test]
    async fn invalid_url_maps_to_invalid() {
        let err = reqwest::Client::new()
            .get("not a url")
            .send()
            .await
            .expect_err("url should not parse");

        assert!(matches!(err.into_transport(), TransportError::Invalid(_)));
    }

    #[tokio::test]
    async fn elapsed_timeout_maps_to_timeout() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let err = reqwest::Client::new()
            .get(server.uri())
            .timeout(Duration::from_millis(50))
            .send()
            .await
            .expect_err("request should time out");

        assert!(matches!(err.into_transport(), TransportError::Timeout(_)));
    }

    #[test]
    fn infra_error_round_trips_domain_error() {
        let infra: InfraError = ChatwireError::Internal("boom".into()).into();
        let domain: ChatwireError = infra.into();
        assert!(matches!(domain, ChatwireError::Internal(msg) if msg == "boom"));
    }
}
