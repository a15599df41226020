//! Turns a `(method, url, data, overrides)` call into a [`RequestConfig`].
//!
//! Payload placement depends on the method: read-style methods send a JSON
//! object as query parameters, write-style methods send the payload as the
//! body. Multipart bodies never carry a caller-chosen `Content-Type`; the
//! transport has to write its own boundary.

use chatwire_domain::constants::JSON_CONTENT_TYPE;
use chatwire_domain::{Method, Payload};
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::config::{RequestConfig, RequestOverrides};

/// Build the transport configuration for one call.
///
/// Never fails: an empty or unparseable `url` is passed through and the
/// transport reports it.
pub fn normalize(
    method: &str,
    url: &str,
    data: Payload,
    overrides: RequestOverrides,
) -> RequestConfig {
    let method = Method::parse(method).unwrap_or_else(|| {
        debug!(raw = method, "unrecognized method, defaulting to GET");
        Method::Get
    });

    let multipart = data.is_multipart();
    let (mut query, body) = place_payload(method, data);
    merge_query(&mut query, overrides.query);
    let headers = merge_headers(&overrides.headers, multipart);

    RequestConfig {
        method,
        url: url.to_string(),
        headers,
        timeout: overrides.timeout,
        query,
        body,
        cancel: CancellationToken::new(),
    }
}

fn place_payload(method: Method, data: Payload) -> (Vec<(String, String)>, Option<Payload>) {
    if method.is_read() {
        let query = match data {
            Payload::Empty => Vec::new(),
            Payload::Json(value) => query_pairs(&value),
            Payload::Multipart(_) => {
                warn!(%method, "multipart payload dropped from read request");
                Vec::new()
            }
        };
        return (query, None);
    }

    if data.is_empty() {
        (Vec::new(), None)
    } else {
        (Vec::new(), Some(data))
    }
}

/// Flatten a JSON object into query pairs.
///
/// Scalars become their text form, arrays repeat as `key[]`, nested objects
/// are sent as JSON text and `null` values are skipped.
pub fn query_pairs(value: &Value) -> Vec<(String, String)> {
    let object = match value {
        Value::Object(object) => object,
        Value::Null => return Vec::new(),
        other => {
            warn!(kind = json_kind(other), "non-object query payload dropped");
            return Vec::new();
        }
    };

    let mut pairs = Vec::with_capacity(object.len());
    for (key, value) in object {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                let key = format!("{key}[]");
                pairs.extend(
                    items.iter().filter_map(scalar_text).map(|text| (key.clone(), text)),
                );
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn merge_query(query: &mut Vec<(String, String)>, extra: Vec<(String, String)>) {
    for (key, _) in &extra {
        query.retain(|(existing, _)| existing != key);
    }
    query.extend(extra);
}

fn merge_headers(overrides: &HeaderMap, multipart: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

    for name in overrides.keys() {
        headers.remove(name);
        for value in overrides.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    if multipart {
        headers.remove(CONTENT_TYPE);
    }
    headers
}
