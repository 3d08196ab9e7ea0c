use tracing::{info, warn};

use crate::error::{ApiError, ValidationError};
use crate::storage::TokenStorage;
use crate::transport::Transport;
use crate::types::Credentials;
use crate::validation::validate_credentials;

use super::login::PASSWORD_TOO_SHORT;
use super::{Context, Route};

pub const INVALID_EMAIL: &str = "Please enter a valid email address.";
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

/// Registration screen. Success does not log in; it sends the user to the
/// login screen.
#[derive(Debug, Clone, Default)]
pub struct RegisterView {
    pub email: String,
    pub password: String,
    error: String,
}

impl RegisterView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> &str {
        &self.error
    }

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
        if let Err(e) = request_register(ctx, &credentials) {
            warn!(error = %e, "registration request failed");
            self.error = e
                .backend_message()
                .unwrap_or(REGISTRATION_FAILED)
                .to_string();
            return None;
        }

        info!(email = %self.email, "registration succeeded");
        self.email.clear();
        self.password.clear();
        Some(Route::Login)
    }
}

fn request_register<T: Transport, S: TokenStorage>(
    ctx: &Context<T, S>,
    credentials: &Credentials,
) -> Result<(), ApiError> {
    let request = ctx.api.build_register(credentials)?;
    let response = ctx.send(request)?;
    ctx.api.parse_register(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use crate::session::SessionStore;
    use crate::storage::MemoryTokenStorage;
    use crate::transport::ScriptedTransport;

    fn context() -> Context<ScriptedTransport, MemoryTokenStorage> {
        Context::new(
            ApiClient::new("http://localhost:3000"),
            ScriptedTransport::new(),
            SessionStore::new(MemoryTokenStorage::new()),
        )
    }

    fn view(email: &str, password: &str) -> RegisterView {
        RegisterView {
            email: email.to_string(),
            password: password.to_string(),
            ..RegisterView::default()
        }
    }

    #[test]
    fn validation_messages_match_register_screen() {
        let mut ctx = context();

        let mut bad_email = view("a@b", "secret");
        assert_eq!(bad_email.submit(&mut ctx), None);
        assert_eq!(bad_email.error(), INVALID_EMAIL);

        let mut short = view("a@b.com", "12345");
        assert_eq!(short.submit(&mut ctx), None);
        assert_eq!(short.error(), PASSWORD_TOO_SHORT);

        assert!(ctx.transport.requests().is_empty());
    }

    #[test]
    fn success_navigates_to_login_without_session() {
        let mut ctx = context();
        ctx.transport.respond(201, r#"{"id":1,"email":"a@b.com"}"#);
        let mut view = view("a@b.com", "secret");

        assert_eq!(view.submit(&mut ctx), Some(Route::Login));
        assert!(!ctx.session.is_authenticated());
        assert!(view.email.is_empty());

        let sent = &ctx.transport.requests()[0];
        assert!(sent.path.ends_with("/auth/register"));
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["email"], "a@b.com");
        assert_eq!(body["password"], "secret");
    }

    #[test]
    fn backend_message_is_shown_verbatim() {
        let mut ctx = context();
        ctx.transport.respond(409, r#"{"message":"User already exists"}"#);
        let mut view = view("a@b.com", "secret");

        assert_eq!(view.submit(&mut ctx), None);
        assert_eq!(view.error(), "User already exists");
    }

    #[test]
    fn failure_without_message_is_generic() {
        let mut ctx = context();
        ctx.transport.respond(500, "oops");
        let mut view = view("a@b.com", "secret");
        view.submit(&mut ctx);
        assert_eq!(view.error(), REGISTRATION_FAILED);

        ctx.transport.fail("offline");
        view.submit(&mut ctx);
        assert_eq!(view.error(), REGISTRATION_FAILED);
    }
}
