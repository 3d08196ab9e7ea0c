//! Todo list screen.
//!
//! # Design
//! The cached list is never patched locally: every successful mutation is
//! followed by a full `GET /todo` that replaces it wholesale. Failed calls
//! are logged and swallowed, leaving the cache as it was; nothing is queued,
//! deduplicated or retried, so two quick toggles of one item simply race and
//! the last re-fetch wins.
//!
//! At most one item is in edit mode, tracked by a single [`EditState`].

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::storage::TokenStorage;
use crate::transport::Transport;
use crate::types::{Todo, TodoInput};
use crate::validation::validate_title;

use super::{Context, Route};

/// The item being edited and its unsaved title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: i64,
    pub buffer: String,
}

/// Per-item controls offered by the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoAction {
    Edit,
    Delete,
}

/// Counts derived from the cached list on every render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TodoListView {
    todos: Vec<Todo>,
    /// New-item input.
    pub title: String,
    editing: Option<EditState>,
}

impl TodoListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    /// Route guard: without a session, redirect to login and fetch nothing.
    pub fn mount<T: Transport, S: TokenStorage>(&mut self, ctx: &Context<T, S>) -> Option<Route> {
        if !ctx.session.is_authenticated() {
            debug!("no session, redirecting to login");
            return Some(Route::Login);
        }
        self.fetch(ctx);
        None
    }

    /// Replace the cached list with the backend's.
    pub fn fetch<T: Transport, S: TokenStorage>(&mut self, ctx: &Context<T, S>) {
        let result = ctx.send(ctx.api.build_list_todos()).and_then(|resp| ctx.api.parse_list_todos(resp));
        match result {
            Ok(todos) => self.todos = todos,
            Err(e) => warn!(error = %e, "failed to fetch todos"),
        }
    }

    /// Create an item from the `title` input. Blank input is ignored.
    pub fn add<T: Transport, S: TokenStorage>(&mut self, ctx: &Context<T, S>) {
        if validate_title(&self.title).is_err() {
            return;
        }
        let input = TodoInput {
            title: self.title.clone(),
            is_done: false,
        };
        let result = ctx
            .api
            .build_create_todo(&input)
            .and_then(|req| ctx.send(req))
            .and_then(|resp| ctx.api.parse_create_todo(resp));
        match result {
            Ok(()) => {
                self.title.clear();
                self.fetch(ctx);
            }
            Err(e) => warn!(error = %e, "failed to add todo"),
        }
    }

    /// Flip `is_done` for the cached item with `id`. Unknown ids are ignored.
    pub fn toggle<T: Transport, S: TokenStorage>(&mut self, ctx: &Context<T, S>, id: i64) {
        let Some(todo) = self.todos.iter().find(|todo| todo.id == id) else {
            debug!(id, "toggle ignored, todo not in list");
            return;
        };
        let input = TodoInput {
            title: todo.title.clone(),
            is_done: !todo.is_done,
        };
        match self.update(ctx, id, &input) {
            Ok(()) => self.fetch(ctx),
            Err(e) => warn!(id, error = %e, "failed to toggle todo"),
        }
    }

    pub fn delete<T: Transport, S: TokenStorage>(&mut self, ctx: &Context<T, S>, id: i64) {
        let result = ctx
            .send(ctx.api.build_delete_todo(id))
            .and_then(|resp| ctx.api.parse_delete_todo(resp));
        match result {
            Ok(()) => self.fetch(ctx),
            Err(e) => warn!(id, error = %e, "failed to delete todo"),
        }
    }

    /// Enter edit mode for an open item, seeding the buffer with its title.
    /// Done or unknown items cannot be edited.
    pub fn start_edit(&mut self, id: i64) -> bool {
        match self.todos.iter().find(|todo| todo.id == id) {
            Some(todo) if !todo.is_done => {
                self.editing = Some(EditState {
                    id,
                    buffer: todo.title.clone(),
                });
                true
            }
            _ => false,
        }
    }

    pub fn set_edit_buffer(&mut self, text: &str) {
        if let Some(edit) = self.editing.as_mut() {
            edit.buffer = text.to_string();
        }
    }

    /// Commit the edit buffer as the title of `id`. A blank buffer changes
    /// nothing and issues no request.
    pub fn save_edit<T: Transport, S: TokenStorage>(&mut self, ctx: &Context<T, S>, id: i64, is_done: bool) {
        let Some(edit) = self.editing.as_ref() else {
            return;
        };
        if validate_title(&edit.buffer).is_err() {
            return;
        }
        let input = TodoInput {
            title: edit.buffer.clone(),
            is_done,
        };
        match self.update(ctx, id, &input) {
            Ok(()) => {
                self.editing = None;
                self.fetch(ctx);
            }
            Err(e) => warn!(id, error = %e, "failed to update todo"),
        }
    }

    /// Leave edit mode, dropping the buffer.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// End the session; the screen then belongs on the login route.
    pub fn logout<T: Transport, S: TokenStorage>(&mut self, ctx: &mut Context<T, S>) -> Route {
        ctx.session.logout();
        *self = Self::default();
        Route::Login
    }

    pub fn stats(&self) -> TodoStats {
        let completed = self.todos.iter().filter(|todo| todo.is_done).count();
        TodoStats {
            total: self.todos.len(),
            completed,
            remaining: self.todos.len() - completed,
        }
    }

    /// Controls for one row: Edit and Delete for open items, only Delete
    /// once done, nothing while the row is in edit mode.
    pub fn actions_for(&self, todo: &Todo) -> &'static [TodoAction] {
        if self.editing.as_ref().is_some_and(|edit| edit.id == todo.id) {
            &[]
        } else if todo.is_done {
            &[TodoAction::Delete]
        } else {
            &[TodoAction::Edit, TodoAction::Delete]
        }
    }

    fn update<T: Transport, S: TokenStorage>(
        &self,
        ctx: &Context<T, S>,
        id: i64,
        input: &TodoInput,
    ) -> Result<(), ApiError> {
        let request = ctx.api.build_update_todo(id, input)?;
        ctx.api.parse_update_todo(ctx.send(request)?)
    }
}
