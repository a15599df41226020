use std::time::Duration;

use async_trait::async_trait;
use chatwire_core::{RequestConfig, Transport};
use chatwire_domain::{
    ChatwireError, EnvironmentConfig, FormPartBody, Method, MultipartForm, Payload, RawResponse,
    TransportError,
};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, Request, Response};
use tracing::debug;

use crate::errors::{InfraError, IntoTransportError};

/// [`Transport`] that performs calls with a shared reqwest client.
///
/// Relative request URLs are joined onto the configured base URL. Every
/// received response is returned as-is, whatever its status; classification
/// happens in the core service.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
    base_url: String,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Transport using the base URL and timeout of `config`.
    pub fn from_config(config: &EnvironmentConfig) -> Result<Self, ChatwireError> {
        Self::builder().base_url(config.base_url.clone()).timeout(config.timeout()).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(&self, config: &RequestConfig) -> Result<Request, TransportError> {
        let url = join_url(&self.base_url, &config.url);
        let mut builder =
            self.client.request(http_method(config.method), url).headers(config.headers.clone());

        if !config.query.is_empty() {
            builder = builder.query(&config.query);
        }

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        match &config.body {
            Some(Payload::Json(value)) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|err| TransportError::Invalid(format!("unencodable body: {err}")))?;
                builder = builder.body(bytes);
            }
            Some(Payload::Multipart(form)) => {
                builder = builder.multipart(multipart_form(form)?);
            }
            Some(Payload::Empty) | None => {}
        }

        builder.build().map_err(IntoTransportError::into_transport)
    }

    async fn execute(&self, request: Request) -> Result<RawResponse, TransportError> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            err.into_transport()
        })?;

        debug!(%method, %url, status = %response.status(), "received HTTP response");
        read_response(response).await
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, config: &RequestConfig) -> Result<RawResponse, TransportError> {
        let request = self.build_request(config)?;

        tokio::select! {
            biased;
            _ = config.cancel.cancelled() => {
                debug!(method = %config.method, url = %config.url, "aborting cancelled HTTP request");
                Err(TransportError::Aborted("request cancelled before completion".into()))
            }
            result = self.execute(request) => result,
        }
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        let defaults = EnvironmentConfig::default();
        let timeout = defaults.timeout();
        Self {
            base_url: defaults.base_url,
            timeout,
            user_agent: None,
            default_headers: None,
        }
    }
}

impl ReqwestTransportBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Timeout for calls that do not carry their own.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<ReqwestTransport, ChatwireError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| ChatwireError::from(InfraError::from(err)))?;

        Ok(ReqwestTransport { client, base_url: self.base_url })
    }
}

/// Join `url` onto `base_url` unless it is already absolute.
///
/// Slashes at the seam are collapsed to one. An empty `url` resolves to the
/// base URL itself.
pub fn join_url(base_url: &str, url: &str) -> String {
    if is_absolute(url) || base_url.is_empty() {
        return url.to_string();
    }
    if url.is_empty() {
        return base_url.to_string();
    }
    format!("{}/{}", base_url.trim_end_matches('/'), url.trim_start_matches('/'))
}

/// `scheme://...` or protocol-relative `//...`.
fn is_absolute(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn multipart_form(form: &MultipartForm) -> Result<Form, TransportError> {
    form.parts().iter().try_fold(Form::new(), |acc, part| match &part.body {
        FormPartBody::Text(value) => Ok(acc.text(part.name.clone(), value.clone())),
        FormPartBody::File { file_name, mime, bytes } => {
            let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
            if let Some(mime) = mime {
                file = file.mime_str(mime).map_err(|err| {
                    TransportError::Invalid(format!("invalid mime type for {}: {err}", part.name))
                })?;
            }
            Ok(acc.part(part.name.clone(), file))
        }
    })
}

async fn read_response(response: Response) -> Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.map_err(IntoTransportError::into_transport)?;

    Ok(RawResponse { status, content_type, body })
}

#[cfg(test)]
mod tests {
    use chatwire_core::{normalize, RequestOverrides};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn transport_for(server: &MockServer) -> ReqwestTransport {
        ReqwestTransport::builder().base_url(server.uri()).build().expect("transport")
    }

    #[test]
    fn join_url_collapses_slashes() {
        assert_eq!(join_url("http://h:1/", "/a/b"), "http://h:1/a/b");
        assert_eq!(join_url("http://h:1", "a"), "http://h:1/a");
        assert_eq!(join_url("http://h:1/api", ""), "http://h:1/api");
    }

    #[test]
    fn join_url_keeps_absolute_urls() {
        assert_eq!(join_url("http://h:1", "https://other/x"), "https://other/x");
        assert_eq!(join_url("http://h:1", "//cdn/x"), "//cdn/x");
        assert_eq!(join_url("", "/a"), "/a");
        assert!(!is_absolute("/redirect?to=http://x"));
    }

    #[tokio::test]
    async fn returns_non_success_responses_unclassified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        let config = normalize("get", "/missing", Payload::Empty, RequestOverrides::new());
        let response = transport_for(&server).send(&config).await.expect("response");

        assert_eq!(response.status, 404);
        assert_eq!(response.body, "nope");
    }

    #[tokio::test]
    async fn sends_json_body_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/send"))
            .and(query_param("trace", "1"))
            .and(header("content-type", "application/json;charset=UTF-8"))
            .and(body_json(json!({"text": "hi"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string(r#"{"code":200}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = normalize(
            "post",
            "/chat/send",
            json!({"text": "hi"}).into(),
            RequestOverrides::new().query("trace", "1"),
        );
        let response = transport_for(&server).send(&config).await.expect("response");

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn builder_applies_user_agent_and_default_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "chatwire-web/1.0"))
            .and(header("x-client", "desktop"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut defaults = HeaderMap::new();
        defaults.insert("x-client", reqwest::header::HeaderValue::from_static("desktop"));
        let transport = ReqwestTransport::builder()
            .base_url(server.uri())
            .user_agent("chatwire-web/1.0")
            .default_headers(defaults)
            .build()
            .expect("transport");

        let config = normalize("get", "/ping", Payload::Empty, RequestOverrides::new());
        let response = transport.send(&config).await.expect("response");

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn cancelled_token_aborts_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let mut config = normalize("get", "/slow", Payload::Empty, RequestOverrides::new());
        let token = CancellationToken::new();
        config.cancel = token.clone();

        let transport = transport_for(&server);
        let call = tokio::spawn(async move { transport.send(&config).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();

        let result = call.await.expect("join");
        assert!(matches!(result, Err(TransportError::Aborted(_))));
    }

    #[tokio::test]
    async fn per_call_timeout_overrides_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = normalize(
            "get",
            "/slow",
            Payload::Empty,
            RequestOverrides::new().timeout(Duration::from_millis(50)),
        );
        let result = transport_for(&server).send(&config).await;

        assert!(matches!(result, Err(TransportError::Timeout(_))));
    }

    #[test]
    fn rejects_bad_mime_type() {
        let form = MultipartForm::new().file("avatar", "a.png", Some("not a mime"), vec![1, 2]);
        assert!(matches!(multipart_form(&form), Err(TransportError::Invalid(_))));
    }
}
