//! Parsing of one input line into a shell command.

use yeslist_core::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(Route),
    Help,
    Quit,
    Submit,
    Add(String),
    Toggle(i64),
    Edit(i64),
    Save,
    Cancel,
    Delete(i64),
    Refresh,
    Logout,
}

impl Command {
    /// `Ok(None)` for a blank line; `Err` carries a message for the user.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "go" => {
                let route = Route::from_path(rest).ok_or_else(|| format!("unknown route: {rest}"))?;
                Command::Go(route)
            }
            // Landing-page links.
            "login" => Command::Go(Route::Login),
            "register" => Command::Go(Route::Register),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "submit" => Command::Submit,
            "add" => Command::Add(rest.to_string()),
            "toggle" | "done" => Command::Toggle(parse_id(rest)?),
            "edit" => Command::Edit(parse_id(rest)?),
            "save" => Command::Save,
            "cancel" => Command::Cancel,
            "delete" | "rm" => Command::Delete(parse_id(rest)?),
            "refresh" => Command::Refresh,
            "logout" => Command::Logout,
            other => return Err(format!("unknown command: {other} (try `help`)")),
        };
        Ok(Some(command))
    }
}

fn parse_id(text: &str) -> Result<i64, String> {
    text.parse().map_err(|_| format!("expected a todo id, got `{text}`"))
}
