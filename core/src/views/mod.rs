//! Screen view-models: routes, the shared context, and the three screens.
//!
//! # Design
//! Each screen owns its form state and talks to the backend only through
//! [`Context`], which attaches the session credential to every request.
//! Screens return the [`Route`] to navigate to instead of navigating
//! themselves; the host decides how to render the result.

mod login;
mod register;
mod todos;

pub use login::LoginView;
pub use register::RegisterView;
pub use todos::{EditState, TodoAction, TodoListView, TodoStats};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::SessionStore;
use crate::storage::TokenStorage;
use crate::transport::Transport;

/// Navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    Register,
    Todos,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Landing, Route::Login, Route::Register, Route::Todos];

    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Todos => "/todos",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Routes this screen links to.
    pub fn links(self) -> &'static [Route] {
        match self {
            Route::Landing => &[Route::Login, Route::Register],
            Route::Login => &[Route::Register],
            Route::Register => &[Route::Login],
            Route::Todos => &[],
        }
    }
}

/// Composition root shared by every screen: request builder, transport and
/// session store, created once at startup.
#[derive(Debug)]
pub struct Context<T, S> {
    pub api: ApiClient,
    pub transport: T,
    pub session: SessionStore<S>,
}

impl<T: Transport, S: TokenStorage> Context<T, S> {
    pub fn new(api: ApiClient, transport: T, session: SessionStore<S>) -> Self {
        Self { api, transport, session }
    }

    /// Attach the current credential and execute `request`.
    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.execute(self.session.authorize(request))
    }
}
