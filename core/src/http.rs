//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `ApiClient` builds `HttpRequest`
//! values and parses `HttpResponse` values; a `Transport` implementation
//! performs the actual round-trip in between. The credential is attached to
//! each request explicitly (see `SessionStore::authorize`) rather than living
//! in a shared header map.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `ApiClient::build_*` methods. `path` is the absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set `name` to `value`, replacing any existing value for that header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Drop every value for `name`.
    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: "http://localhost:3000/todo".to_string(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    #[test]
    fn header_lookup_ignores_case() {
        assert_eq!(request().header("accept"), Some("application/json"));
        assert_eq!(request().header("authorization"), None);
    }

    #[test]
    fn with_header_replaces_existing_value() {
        let req = request()
            .with_header("authorization", "Bearer a")
            .with_header("Authorization", "Bearer b");
        assert_eq!(req.header("authorization"), Some("Bearer b"));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn without_header_removes_all_values() {
        let req = request().with_header("authorization", "Bearer a").without_header("AUTHORIZATION");
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn any_2xx_is_success() {
        for status in [200, 201, 204] {
            let resp = HttpResponse { status, headers: Vec::new(), body: String::new() };
            assert!(resp.is_success());
        }
        let resp = HttpResponse { status: 401, headers: Vec::new(), body: String::new() };
        assert!(!resp.is_success());
    }
}
