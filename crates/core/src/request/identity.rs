use std::fmt;

use chatwire_domain::Method;
use url::Url;

use super::config::RequestConfig;

/// Deduplication key: the method plus the normalized URL path.
///
/// Two calls with the same identity are the same logical operation no matter
/// what payload they carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestIdentity {
    method: Method,
    path: String,
}

impl RequestIdentity {
    pub fn new(method: Method, url: &str) -> Self {
        Self { method, path: normalize_path(url) }
    }

    pub fn of(config: &RequestConfig) -> Self {
        Self::new(config.method, &config.url)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Drop query, fragment and origin; trim a trailing slash except on root.
fn normalize_path(url: &str) -> String {
    let trimmed = url.trim();
    let path = match Url::parse(trimmed) {
        Ok(parsed) if parsed.has_host() => parsed.path().to_string(),
        _ => trimmed.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let path = if path.starts_with('/') || path.is_empty() { path } else { format!("/{path}") };
    match path.trim_end_matches('/') {
        "" if path.is_empty() => String::new(),
        "" => "/".to_string(),
        stripped => stripped.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_and_fragment_do_not_affect_identity() {
        let a = RequestIdentity::new(Method::Get, "/chat/list?page=1");
        let b = RequestIdentity::new(Method::Get, "/chat/list#top");
        let c = RequestIdentity::new(Method::Get, "/chat/list/");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.path(), "/chat/list");
    }

    #[test]
    fn method_is_part_of_identity() {
        let get = RequestIdentity::new(Method::Get, "/a");
        let post = RequestIdentity::new(Method::Post, "/a");
        assert_ne!(get, post);
    }

    #[test]
    fn absolute_urls_reduce_to_path() {
        let id = RequestIdentity::new(Method::Get, "http://localhost:8090/user/info?x=1");
        assert_eq!(id, RequestIdentity::new(Method::Get, "/user/info"));
    }

    #[test]
    fn relative_without_leading_slash() {
        let id = RequestIdentity::new(Method::Post, "user/info");
        assert_eq!(id.path(), "/user/info");
        assert_eq!(id.to_string(), "POST /user/info");
    }

    #[test]
    fn root_and_empty_paths() {
        assert_eq!(RequestIdentity::new(Method::Get, "/").path(), "/");
        assert_eq!(RequestIdentity::new(Method::Get, "").path(), "");
    }
}
