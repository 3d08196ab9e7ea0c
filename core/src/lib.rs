//! Client core for the YesList todo app.
//!
//! # Overview
//! Email/password authentication, a session store that persists the bearer
//! token, and view-models for the login, register and todo-list screens.
//! Requests are built and parsed as plain data (`ApiClient`); a `Transport`
//! executes them, so every screen can be driven deterministically in tests.
//!
//! # Design
//! - `ApiClient` is stateless apart from its base URL and default headers.
//! - `SessionStore` owns the token and signs each request explicitly through
//!   `authorize`; there is no shared, mutated header map.
//! - Token claims are decoded for display only. The backend is the only
//!   authority on whether a token is valid.
//! - `views::Context` is the composition root handed to every screen.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod storage;
pub mod transport;
pub mod types;
pub mod validation;
pub mod views;

pub use client::ApiClient;
pub use error::{ApiError, SessionError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{decode_claims, Claims, Session, SessionStore};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use transport::{Transport, UreqTransport};
#[cfg(any(test, feature = "test-util"))]
pub use transport::ScriptedTransport;
pub use types::{Credentials, ErrorBody, LoginResponse, Todo, TodoInput};
pub use views::{
    Context, EditState, LoginView, RegisterView, Route, TodoAction, TodoListView, TodoStats,
};
