use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// YesList terminal client
#[derive(Parser, Debug)]
#[command(name = "yeslist")]
#[command(about = "Terminal client for the YesList todo app")]
#[command(version)]
pub struct Args {
    /// Backend base URL
    #[arg(long, env = "YESLIST_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// File holding the session token
    ///
    /// Defaults to `yeslist/token` under the platform config directory.
    #[arg(long, env = "YESLIST_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token_file: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let token_file = match args.token_file {
            Some(path) => path,
            None => default_token_path()?,
        };
        Ok(Self {
            api_url: args.api_url,
            token_file,
            log_level: args.log_level,
        })
    }
}

pub fn default_token_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Failed to get config directory")?;
    Ok(dir.join("yeslist").join("token"))
}
