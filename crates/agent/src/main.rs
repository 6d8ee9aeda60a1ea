use std::env;
use std::io;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warden_agent::APP_NAME;
use warden_agent::cli::Args;
use warden_agent::config::{AgentConfig, DEFAULT_LOG_FILTER, LOG_ENV};
use warden_agent::session::run_session;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let config = AgentConfig::resolve(args.config.as_deref(), &args.overrides())?;

    // stdout carries the protocol, so logs go to stderr.
    let filter = config.log_filter(env::var(LOG_ENV).ok());
    let env_filter =
        EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    info!(
        app = APP_NAME,
        strategy = ?config.session.strategy,
        grid_size = config.session.grid_size,
        max_actions = config.session.max_actions,
        "configuration loaded"
    );

    let outcome = run_session(io::stdin().lock(), io::stdout().lock(), &config)?;
    info!(?outcome, "session complete");
    Ok(())
}
