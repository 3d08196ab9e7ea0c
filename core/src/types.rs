//! Wire DTOs for the todo backend.
//!
//! # Design
//! These types mirror the backend's JSON schema but are defined
//! independently from the mock-server crate; integration tests catch drift.
//! The backend spells the completion flag `isDone`, so the Rust field is
//! renamed at the serde boundary.

use serde::{Deserialize, Serialize};

/// A single todo item owned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(rename = "isDone")]
    pub is_done: bool,
}

/// Body of `POST /todo` and `PUT /todo/{id}`. Updates always send both
/// fields; the backend has no partial-update contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoInput {
    pub title: String,
    #[serde(rename = "isDone")]
    pub is_done: bool,
}

/// Body of `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Error body the backend attaches to failed responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_uses_backend_field_names() {
        let todo: Todo = serde_json::from_str(r#"{"id":7,"title":"Walk dog","isDone":true}"#).unwrap();
        assert_eq!(todo.id, 7);
        assert!(todo.is_done);

        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["isDone"], true);
        assert!(json.get("is_done").is_none());
    }

    #[test]
    fn error_body_tolerates_missing_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"nope"}"#).unwrap();
        assert!(body.message.is_none());
    }
}
