//! Error types for the client core.
//!
//! # Design
//! `ApiError` covers everything that can go wrong between building a request
//! and parsing its response. `NotFound` keeps its own variant because the
//! todo screen hits it whenever an item vanished under a stale list. Every
//! other non-2xx lands in `Http` together with the backend's `message`, which
//! the auth screens show to the user.
//!
//! `ValidationError` never reaches the network; `SessionError` comes from
//! decoding or persisting a token.

use thiserror::Error;

/// Errors returned by `ApiClient` parse methods and `Transport` implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound { message: Option<String> },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {}", describe(.message, .body))]
    Http {
        status: u16,
        message: Option<String>,
        body: String,
    },

    /// No response at all: connection refused, DNS, broken pipe.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The backend-supplied `message`, if the failed response carried one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { message } | ApiError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

fn describe<'a>(message: &'a Option<String>, body: &'a str) -> &'a str {
    message.as_deref().unwrap_or(body)
}

/// Client-side pre-flight failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("email address is malformed")]
    InvalidEmail,

    #[error("password is shorter than 6 characters")]
    PasswordTooShort,

    #[error("title is empty")]
    EmptyTitle,
}

/// Failures while decoding or persisting a session token.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The token is not a decodable JWT.
    #[error("token could not be decoded: {0}")]
    Decode(String),

    /// Durable storage could not be read or written.
    #[error("token storage failed: {0}")]
    Storage(#[from] std::io::Error),
}
