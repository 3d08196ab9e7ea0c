//! Session store: the current bearer token and the identity decoded from it.
//!
//! # Design
//! `SessionStore` is an explicitly owned object created once by the
//! composition root, hydrated once from durable storage, and passed to every
//! screen. It never mutates a shared HTTP client; instead `authorize` attaches
//! the credential to each outgoing request.
//!
//! The token payload is decoded without checking the signature. Claims are
//! for display only and are not an authorization check: the backend stays
//! the sole authority on whether a token is valid.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::http::HttpRequest;
use crate::storage::TokenStorage;

pub const AUTHORIZATION: &str = "authorization";

/// Decoded JWT payload.
///
/// Any JSON object is accepted. Well-known claims of an unexpected type
/// read as `None` (numbers in `sub` and `email` are kept as text), and the
/// raw value of everything else stays in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds", skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, deserialize_with = "lenient_seconds", skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Best human-readable name for the user: email, then subject.
    pub fn display_name(&self) -> Option<&str> {
        self.email.as_deref().or(self.sub.as_deref())
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Seconds since the epoch, as an integer, a float or a numeric string.
fn lenient_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_i64().or_else(|| number.as_f64().map(|secs| secs as i64)),
        Value::String(text) => text.trim().parse::<f64>().ok().map(|secs| secs as i64),
        _ => None,
    })
}

/// Decode the payload segment of a JWT. The signature is not verified.
pub fn decode_claims(token: &str) -> Result<Claims, SessionError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(SessionError::Decode("expected three dot-separated segments".to_string())),
    };
    // Some issuers pad anyway.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| SessionError::Decode(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| SessionError::Decode(e.to_string()))
}

/// Token plus decoded identity. `user` is `Some` iff `token` is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    user: Option<Claims>,
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&Claims> {
        self.user.as_ref()
    }
}

/// Single source of truth for "is a user logged in, and as whom".
#[derive(Debug)]
pub struct SessionStore<S> {
    session: Session,
    storage: S,
}

impl<S: TokenStorage> SessionStore<S> {
    /// Empty session; call `hydrate` once at startup.
    pub fn new(storage: S) -> Self {
        Self {
            session: Session::default(),
            storage,
        }
    }

    /// Restore the persisted token, if any. An unreadable or undecodable
    /// token leaves the session empty; a corrupted one is also removed from
    /// storage.
    pub fn hydrate(&mut self) {
        let token = match self.storage.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("no persisted token");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read persisted token");
                return;
            }
        };

        match decode_claims(&token) {
            Ok(claims) => {
                info!(user = claims.display_name().unwrap_or("unknown"), "restored session");
                self.session = Session {
                    token: Some(token),
                    user: Some(claims),
                };
            }
            Err(e) => {
                warn!(error = %e, "discarding corrupted persisted token");
                if let Err(e) = self.storage.clear() {
                    warn!(error = %e, "failed to remove corrupted token");
                }
            }
        }
    }

    /// Replace the session with `token`. Nothing changes if the token cannot
    /// be decoded or persisted.
    pub fn login(&mut self, token: &str) -> Result<(), SessionError> {
        let claims = decode_claims(token)?;
        self.storage.store(token)?;
        info!(user = claims.display_name().unwrap_or("unknown"), "logged in");
        self.session = Session {
            token: Some(token.to_string()),
            user: Some(claims),
        };
        Ok(())
    }

    /// Clear the session and the persisted token. Idempotent.
    pub fn logout(&mut self) {
        if self.session.token.is_some() {
            info!("logged out");
        }
        self.session = Session::default();
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "failed to remove persisted token");
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    pub fn user(&self) -> Option<&Claims> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.token.is_some()
    }

    /// `Bearer <token>` while logged in.
    pub fn authorization(&self) -> Option<String> {
        self.session.token.as_ref().map(|token| format!("Bearer {token}"))
    }

    /// Attach the current credential to `request`, or strip any stale one
    /// when logged out.
    pub fn authorize(&self, request: HttpRequest) -> HttpRequest {
        match self.authorization() {
            Some(value) => request.with_header(AUTHORIZATION, value),
            None => request.without_header(AUTHORIZATION),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::storage::MemoryTokenStorage;

    fn token_for(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: "http://localhost:3000/todo".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn decode_reads_known_and_extra_claims() {
        let token = token_for(r#"{"sub":"1","email":"a@b.com","exp":1700000000,"role":"user"}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("1"));
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));
        assert_eq!(claims.exp, Some(1_700_000_000));
        assert_eq!(claims.extra["role"], "user");
        assert_eq!(claims.display_name(), Some("a@b.com"));
    }

    #[test]
    fn decode_tolerates_loosely_typed_claims() {
        let token = token_for(r#"{"sub":42,"email":"a@b.com","iat":1700000000,"exp":1700086400.5}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert_eq!(claims.exp, Some(1_700_086_400));

        let odd = decode_claims(&token_for(r#"{"sub":null,"email":["x"],"exp":"1700000000"}"#)).unwrap();
        assert_eq!(odd.sub, None);
        assert_eq!(odd.email, None);
        assert_eq!(odd.exp, Some(1_700_000_000));
        assert_eq!(odd.display_name(), None);
    }

    #[test]
    fn login_accepts_numeric_subject() {
        let storage = MemoryTokenStorage::new();
        let mut store = SessionStore::new(storage.clone());
        let token = token_for(r#"{"sub":42,"iat":1700000000}"#);

        store.login(&token).unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.user().and_then(Claims::display_name), Some("42"));
        assert_eq!(storage.get().as_deref(), Some(token.as_str()));

        let mut restored = SessionStore::new(storage);
        restored.hydrate();
        assert_eq!(restored.token(), Some(token.as_str()));
    }

    #[test]
    fn decode_rejects_malformed_tokens() {
        for token in ["", "not-a-jwt", "a.b", "a.b.c.d", "a.!!!.c"] {
            assert!(matches!(decode_claims(token), Err(SessionError::Decode(_))), "{token}");
        }
        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("plain text"));
        assert!(decode_claims(&not_json).is_err());
    }

    #[test]
    fn login_sets_token_user_and_persists() {
        let storage = MemoryTokenStorage::new();
        let mut store = SessionStore::new(storage.clone());
        let token = token_for(r#"{"sub":"7","email":"a@b.com"}"#);

        store.login(&token).unwrap();

        assert_eq!(store.token(), Some(token.as_str()));
        assert_eq!(store.user().and_then(|u| u.sub.as_deref()), Some("7"));
        assert_eq!(storage.get().as_deref(), Some(token.as_str()));
        assert_eq!(store.authorization(), Some(format!("Bearer {token}")));
    }

    #[test]
    fn login_with_undecodable_token_changes_nothing() {
        let storage = MemoryTokenStorage::new();
        let mut store = SessionStore::new(storage.clone());

        assert!(store.login("garbage").is_err());
        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
        assert!(storage.get().is_none());
    }

    #[test]
    fn logout_restores_pre_login_state() {
        let storage = MemoryTokenStorage::new();
        let mut store = SessionStore::new(storage.clone());
        let before = store.session().clone();

        store.login(&token_for(r#"{"sub":"7"}"#)).unwrap();
        store.logout();

        assert_eq!(store.session(), &before);
        assert!(store.token().is_none());
        assert!(store.user().is_none());
        assert!(store.authorization().is_none());
        assert!(storage.get().is_none());
        assert!(store.authorize(request()).header(AUTHORIZATION).is_none());

        store.logout();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn hydrate_restores_persisted_session() {
        let token = token_for(r#"{"email":"a@b.com"}"#);
        let mut store = SessionStore::new(MemoryTokenStorage::with_token(&token));
        assert!(!store.is_authenticated());

        store.hydrate();

        assert_eq!(store.token(), Some(token.as_str()));
        assert_eq!(store.user().and_then(Claims::display_name), Some("a@b.com"));
    }

    #[test]
    fn hydrate_without_token_stays_logged_out() {
        let mut store = SessionStore::new(MemoryTokenStorage::new());
        store.hydrate();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn hydrate_discards_corrupted_token() {
        let storage = MemoryTokenStorage::with_token("corrupted");
        let mut store = SessionStore::new(storage.clone());

        store.hydrate();

        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
        assert!(storage.get().is_none());
    }

    #[test]
    fn authorize_attaches_and_strips_bearer() {
        let mut store = SessionStore::new(MemoryTokenStorage::new());
        let token = token_for(r#"{"sub":"1"}"#);

        let stale = request().with_header("Authorization", "Bearer stale");
        assert!(store.authorize(stale).header(AUTHORIZATION).is_none());

        store.login(&token).unwrap();
        let signed = store.authorize(request());
        assert_eq!(signed.header(AUTHORIZATION), Some(format!("Bearer {token}").as_str()));
    }
}
