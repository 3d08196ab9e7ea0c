//! Stateless HTTP request builder and response parser for the todo backend.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and a list of default headers; it
//! carries no session state. Each backend operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The caller attaches credentials and
//! executes the round-trip in between, keeping this type deterministic and
//! free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Credentials, ErrorBody, LoginResponse, Todo, TodoInput};

/// Request builder and response parser for the todo backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    default_headers: Vec<(String, String)>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }

    /// Add a header sent with every request this client builds.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.default_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Get, path, None)
    }

    pub fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        Ok(self.request(HttpMethod::Post, path, Some(to_json(body)?)))
    }

    pub fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        Ok(self.request(HttpMethod::Put, path, Some(to_json(body)?)))
    }

    pub fn delete(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, path, None)
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut headers = self.default_headers.clone();
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.post("/auth/login", credentials)
    }

    pub fn build_register(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.post("/auth/register", credentials)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.get("/todo")
    }

    pub fn build_create_todo(&self, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        self.post("/todo", input)
    }

    pub fn build_update_todo(&self, id: i64, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        self.put(&format!("/todo/{id}"), input)
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        self.delete(&format!("/todo/{id}"))
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        parse_json(response)
    }

    /// The register response body is unspecified, so only the status counts.
    pub fn parse_register(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json(response)
    }

    /// Callers re-fetch after a mutation, so any 2xx body is accepted.
    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn to_json<B: Serialize>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx status codes to the appropriate `ApiError` variant, keeping
/// the backend's `message` when the body carries one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.message);
    if response.status == 404 {
        return Err(ApiError::NotFound { message });
    }
    Err(ApiError::Http {
        status: response.status,
        message,
        body: response.body.clone(),
    })
}
