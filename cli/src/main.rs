use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use yeslist_cli::{Args, Config, Shell};
use yeslist_core::{ApiClient, Context, FileTokenStorage, SessionStore, UreqTransport};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_args(Args::parse())?;

    // Logs go to stderr so they never interleave with the rendered screens.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    tracing::info!(api_url = %config.api_url, token_file = %config.token_file.display(), "starting");

    let api = ApiClient::new(&config.api_url)
        .with_default_header("user-agent", concat!("yeslist/", env!("CARGO_PKG_VERSION")));
    let mut session = SessionStore::new(FileTokenStorage::new(&config.token_file));
    session.hydrate();

    let mut shell =
        Shell::new(Context::new(api, UreqTransport::new(), session)).with_masked_password(io::stdin().is_terminal());
    shell.run(io::stdin().lock(), io::stdout().lock())?;
    Ok(())
}
