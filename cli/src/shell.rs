//! Line-oriented host for the screens.
//!
//! # Design
//! The shell owns the composition root and one instance of each screen. It
//! renders the current route, reads one command, hands it to the screen, and
//! follows whatever route the screen returns. Navigating to a route starts
//! that screen fresh, the way a page mount would; `/todos` runs its session
//! guard on every entry.

use std::io::{self, BufRead, Write};

use tracing::debug;
use yeslist_core::{
    Context, LoginView, RegisterView, Route, TodoAction, TodoListView, TokenStorage, Transport,
};

use crate::command::Command;

const HELP: &str = "\
commands:
  go <path>        navigate to /, /login, /register or /todos
  login, register  follow the landing-page links
  submit           enter email and password on /login or /register
  add <title>      add a todo
  toggle <id>      mark a todo done or not done
  edit <id>        edit an open todo's title, then `save` or `cancel`
  delete <id>      delete a todo
  refresh          re-fetch the list
  logout           end the session
  help, quit";

pub struct Shell<T, S> {
    ctx: Context<T, S>,
    route: Route,
    login: LoginView,
    register: RegisterView,
    todos: TodoListView,
    mask_password: bool,
}

impl<T: Transport, S: TokenStorage> Shell<T, S> {
    /// Start on `/todos` when the (already hydrated) session is live,
    /// otherwise on the landing page.
    pub fn new(ctx: Context<T, S>) -> Self {
        let mut shell = Self {
            ctx,
            route: Route::Landing,
            login: LoginView::new(),
            register: RegisterView::new(),
            todos: TodoListView::new(),
            mask_password: false,
        };
        if shell.ctx.session.is_authenticated() {
            shell.navigate(Route::Todos);
        }
        shell
    }

    /// Read passwords from the controlling terminal without echo instead of
    /// from the shell's input. Only meaningful when a user is typing.
    pub fn with_masked_password(mut self, mask: bool) -> Self {
        self.mask_password = mask;
        self
    }

    pub fn masks_password(&self) -> bool {
        self.mask_password
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn context(&self) -> &Context<T, S> {
        &self.ctx
    }

    pub fn todos(&self) -> &TodoListView {
        &self.todos
    }

    pub fn navigate(&mut self, route: Route) {
        debug!(path = route.path(), "navigate");
        self.route = route;
        match route {
            Route::Landing => {}
            Route::Login => self.login = LoginView::new(),
            Route::Register => self.register = RegisterView::new(),
            Route::Todos => {
                self.todos = TodoListView::new();
                if let Some(redirect) = self.todos.mount(&self.ctx) {
                    self.navigate(redirect);
                }
            }
        }
    }

    /// Run until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> io::Result<()> {
        loop {
            self.render(&mut out)?;
            let Some(line) = prompt(&mut input, &mut out, "> ")? else {
                return Ok(());
            };
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    writeln!(out, "{message}")?;
                    continue;
                }
            };
            if !self.execute(command, &mut input, &mut out)? {
                return Ok(());
            }
        }
    }

    /// Apply one command. Returns `false` when the shell should stop.
    fn execute<R: BufRead, W: Write>(&mut self, command: Command, input: &mut R, out: &mut W) -> io::Result<bool> {
        match command {
            Command::Quit => return Ok(false),
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Go(route) => self.navigate(route),
            Command::Submit => return self.submit(input, out),
            command => match self.route {
                Route::Todos => return self.todo_command(command, input, out),
                _ => writeln!(out, "not available on {}", self.route.path())?,
            },
        }
        Ok(true)
    }

    fn submit<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> io::Result<bool> {
        if !matches!(self.route, Route::Login | Route::Register) {
            writeln!(out, "nothing to submit on {}", self.route.path())?;
            return Ok(true);
        }
        let Some(email) = prompt(input, out, "Email: ")? else {
            return Ok(false);
        };
        let password = if self.mask_password {
            out.flush()?;
            rpassword::prompt_password("Password: ")?
        } else {
            let Some(password) = prompt(input, out, "Password: ")? else {
                return Ok(false);
            };
            password
        };

        let next = if self.route == Route::Login {
            self.login.email = email;
            self.login.password = password;
            self.login.submit(&mut self.ctx)
        } else {
            self.register.email = email;
            self.register.password = password;
            self.register.submit(&mut self.ctx)
        };
        if let Some(route) = next {
            self.navigate(route);
        }
        Ok(true)
    }

    fn todo_command<R: BufRead, W: Write>(&mut self, command: Command, input: &mut R, out: &mut W) -> io::Result<bool> {
        match command {
            Command::Add(title) => {
                self.todos.title = title;
                self.todos.add(&self.ctx);
            }
            Command::Toggle(id) => self.todos.toggle(&self.ctx, id),
            Command::Delete(id) => self.todos.delete(&self.ctx, id),
            Command::Refresh => self.todos.fetch(&self.ctx),
            Command::Edit(id) => {
                if !self.todos.start_edit(id) {
                    writeln!(out, "todo {id} cannot be edited")?;
                    return Ok(true);
                }
                let Some(title) = prompt(input, out, "New title: ")? else {
                    return Ok(false);
                };
                self.todos.set_edit_buffer(&title);
                loop {
                    let Some(choice) = prompt(input, out, "save or cancel? ")? else {
                        return Ok(false);
                    };
                    match choice.trim() {
                        "save" => {
                            self.save_edit();
                            break;
                        }
                        "cancel" => {
                            self.todos.cancel_edit();
                            break;
                        }
                        other => writeln!(out, "type `save` or `cancel`, not `{other}`")?,
                    }
                }
            }
            Command::Save => self.save_edit(),
            Command::Cancel => self.todos.cancel_edit(),
            Command::Logout => {
                let route = self.todos.logout(&mut self.ctx);
                self.navigate(route);
            }
            other => writeln!(out, "not available on {}: {other:?}", self.route.path())?,
        }
        Ok(true)
    }

    fn save_edit(&mut self) {
        let Some(id) = self.todos.editing().map(|edit| edit.id) else {
            return;
        };
        let is_done = self
            .todos
            .todos()
            .iter()
            .find(|todo| todo.id == id)
            .is_some_and(|todo| todo.is_done);
        self.todos.save_edit(&self.ctx, id, is_done);
    }

    fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        match self.route {
            Route::Landing => {
                writeln!(out, "Welcome to Ye's List Todo App")?;
                render_links(out, self.route)?;
            }
            Route::Login => {
                writeln!(out, "YESLIST! | Welcome Back")?;
                render_error(out, self.login.error())?;
                writeln!(out, "Type `submit` to enter your email and password.")?;
                render_links(out, self.route)?;
            }
            Route::Register => {
                writeln!(out, "YESLIST! | Create An Account")?;
                render_error(out, self.register.error())?;
                writeln!(out, "Type `submit` to enter your email and password.")?;
                render_links(out, self.route)?;
            }
            Route::Todos => self.render_todos(out)?,
        }
        Ok(())
    }

    fn render_todos<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let user = self
            .ctx
            .session
            .user()
            .and_then(|claims| claims.display_name())
            .unwrap_or("you");
        writeln!(out, "YESLIST! | My Todos ({user})")?;

        let todos = self.todos.todos();
        if todos.is_empty() {
            writeln!(out, "No todos yet. Add one above!")?;
            return Ok(());
        }
        for todo in todos {
            let mark = if todo.is_done { "x" } else { " " };
            match self.todos.editing() {
                Some(edit) if edit.id == todo.id => {
                    writeln!(out, "[{mark}] {:>4}  editing: {}  (save | cancel)", todo.id, edit.buffer)?;
                }
                _ => {
                    let actions: Vec<&str> = self
                        .todos
                        .actions_for(todo)
                        .iter()
                        .map(|action| match action {
                            TodoAction::Edit => "edit",
                            TodoAction::Delete => "delete",
                        })
                        .collect();
                    writeln!(out, "[{mark}] {:>4}  {}  ({})", todo.id, todo.title, actions.join(" | "))?;
                }
            }
        }
        let stats = self.todos.stats();
        writeln!(
            out,
            "Total: {} tasks | Completed: {} | Remaining: {}",
            stats.total, stats.completed, stats.remaining
        )
    }
}

fn render_error<W: Write>(out: &mut W, error: &str) -> io::Result<()> {
    if error.is_empty() {
        Ok(())
    } else {
        writeln!(out, "! {error}")
    }
}

fn render_links<W: Write>(out: &mut W, route: Route) -> io::Result<()> {
    let links: Vec<&str> = route.links().iter().map(|link| link.path()).collect();
    writeln!(out, "Links: {}", links.join("  "))
}

/// Print `label` and read one line without its newline. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> io::Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
