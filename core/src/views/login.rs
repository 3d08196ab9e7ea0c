use tracing::{info, warn};

use crate::error::{ApiError, ValidationError};
use crate::storage::TokenStorage;
use crate::transport::Transport;
use crate::types::{Credentials, LoginResponse};
use crate::validation::validate_credentials;

use super::{Context, Route};

pub const INVALID_EMAIL: &str = "Please enter a valid email address in the format: name@example.com";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long.";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password. Please try again.";

/// Login screen: form fields read at submit time plus one error line.
#[derive(Debug, Clone, Default)]
pub struct LoginView {
    pub email: String,
    pub password: String,
    error: String,
}

impl LoginView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current error message; empty means none.
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Validate, post `/auth/login`, and on success establish the session.
    /// Returns the route to navigate to, if any.
    pub fn submit<T: Transport, S: TokenStorage>(&mut self, ctx: &mut Context<T, S>) -> Option<Route> {
        self.error.clear();

        if let Err(e) = validate_credentials(&self.email, &self.password) {
            self.error = match e {
                ValidationError::InvalidEmail => INVALID_EMAIL,
                _ => PASSWORD_TOO_SHORT,
            }
            .to_string();
            return None;
        }

        let credentials = Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        };
        let response = match request_login(ctx, &credentials) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "login request failed");
                self.error = match e.backend_message() {
                    Some(message) => format!("Login failed: {message}"),
                    None => INVALID_CREDENTIALS.to_string(),
                };
                return None;
            }
        };

        if let Err(e) = ctx.session.login(&response.token) {
            warn!(error = %e, "could not establish session");
            self.error = format!("Login failed: {e}");
            return None;
        }

        info!(email = %self.email, "login succeeded");
        self.email.clear();
        self.password.clear();
        Some(Route::Todos)
    }
}

fn request_login<T: Transport, S: TokenStorage>(
    ctx: &Context<T, S>,
    credentials: &Credentials,
) -> Result<LoginResponse, ApiError> {
    let request = ctx.api.build_login(credentials)?;
    let response = ctx.send(request)?;
    ctx.api.parse_login(response)
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    use super::*;
    use crate::client::ApiClient;
    use crate::session::SessionStore;
    use crate::storage::MemoryTokenStorage;
    use crate::transport::ScriptedTransport;

    fn jwt() -> String {
        format!("h.{}.s", URL_SAFE_NO_PAD.encode(r#"{"sub":"1","email":"a@b.com"}"#))
    }

    fn context(storage: MemoryTokenStorage) -> Context<ScriptedTransport, MemoryTokenStorage> {
        Context::new(
            ApiClient::new("http://localhost:3000"),
            ScriptedTransport::new(),
            SessionStore::new(storage),
        )
    }

    fn view(email: &str, password: &str) -> LoginView {
        LoginView {
            email: email.to_string(),
            password: password.to_string(),
            ..LoginView::default()
        }
    }

    #[test]
    fn invalid_email_blocks_network_call() {
        let mut ctx = context(MemoryTokenStorage::new());
        let mut view = view("not-an-email", "secret");

        assert_eq!(view.submit(&mut ctx), None);
        assert_eq!(view.error(), INVALID_EMAIL);
        assert!(ctx.transport.requests().is_empty());
    }

    #[test]
    fn short_trimmed_password_blocks_network_call() {
        let mut ctx = context(MemoryTokenStorage::new());
        let mut view = view("a@b.com", "   abc     ");

        assert_eq!(view.submit(&mut ctx), None);
        assert_eq!(view.error(), PASSWORD_TOO_SHORT);
        assert!(ctx.transport.requests().is_empty());
    }

    #[test]
    fn success_establishes_session_and_navigates() {
        let storage = MemoryTokenStorage::new();
        let mut ctx = context(storage.clone());
        let token = jwt();
        ctx.transport.respond(200, &format!(r#"{{"token":"{token}"}}"#));
        let mut view = view("a@b.com", "secret");

        assert_eq!(view.submit(&mut ctx), Some(Route::Todos));
        assert_eq!(ctx.session.token(), Some(token.as_str()));
        assert_eq!(ctx.session.authorization(), Some(format!("Bearer {token}")));
        assert_eq!(storage.get(), Some(token));
        assert!(view.email.is_empty());
        assert!(view.password.is_empty());
        assert!(view.error().is_empty());

        let sent = &ctx.transport.requests()[0];
        assert!(sent.path.ends_with("/auth/login"));
    }

    #[test]
    fn numeric_subject_token_still_logs_in() {
        let mut ctx = context(MemoryTokenStorage::new());
        let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode(r#"{"sub":42,"exp":1700086400.5}"#));
        ctx.transport.respond(200, &format!(r#"{{"token":"{token}"}}"#));
        let mut view = view("a@b.com", "secret");

        assert_eq!(view.submit(&mut ctx), Some(Route::Todos));
        assert!(view.error().is_empty());
        assert_eq!(ctx.session.token(), Some(token.as_str()));
    }

    #[test]
    fn backend_message_is_prefixed() {
        let mut ctx = context(MemoryTokenStorage::new());
        ctx.transport.respond(401, r#"{"message":"Invalid email or password"}"#);
        let mut view = view("a@b.com", "secret");

        assert_eq!(view.submit(&mut ctx), None);
        assert_eq!(view.error(), "Login failed: Invalid email or password");
        assert!(!ctx.session.is_authenticated());
        assert_eq!(view.email, "a@b.com");
    }

    #[test]
    fn network_failure_shows_generic_message() {
        let mut ctx = context(MemoryTokenStorage::new());
        ctx.transport.fail("connection refused");
        let mut view = view("a@b.com", "secret");

        assert_eq!(view.submit(&mut ctx), None);
        assert_eq!(view.error(), INVALID_CREDENTIALS);
    }

    #[test]
    fn undecodable_token_is_a_login_failure() {
        let storage = MemoryTokenStorage::new();
        let mut ctx = context(storage.clone());
        ctx.transport.respond(200, r#"{"token":"garbage"}"#);
        let mut view = view("a@b.com", "secret");

        assert_eq!(view.submit(&mut ctx), None);
        assert!(view.error().starts_with("Login failed:"));
        assert!(!ctx.session.is_authenticated());
        assert!(storage.get().is_none());
    }

    #[test]
    fn latest_error_overwrites_previous_one() {
        let mut ctx = context(MemoryTokenStorage::new());
        let mut view = view("bad", "secret");
        view.submit(&mut ctx);
        assert_eq!(view.error(), INVALID_EMAIL);

        view.email = "a@b.com".to_string();
        view.password = "abc".to_string();
        view.submit(&mut ctx);
        assert_eq!(view.error(), PASSWORD_TOO_SHORT);
    }
}
