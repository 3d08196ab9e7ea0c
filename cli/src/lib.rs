//! Terminal host for the YesList screens: argument parsing, the command
//! language, and the interactive shell loop.

pub mod command;
pub mod config;
pub mod shell;

pub use config::{Args, Config};
pub use shell::Shell;
