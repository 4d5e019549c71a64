mod admin;
mod api_client;
mod auth;
mod check;
mod commands;
mod config;
mod errors;
mod models;
mod result;
mod routes;
mod shell;
mod state;
mod store;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::Command;
use crate::config::Config;
use crate::state::AppState;

/// Scholarship eligibility checker for the terminal.
#[derive(Debug, Parser)]
#[command(name = "scholarcheck", version, about)]
struct Cli {
    /// Backend base URL (overrides SCHOLARCHECK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding tokens and identities (overrides SCHOLARCHECK_STATE_DIR)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env()?.with_overrides(cli.api_url, cli.state_dir);

    // Logs go to stderr; stdout carries the views.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("scholarcheck v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::init(config)?;

    // The shell handles Ctrl-C per command; one-shot commands just stop.
    let outcome = match cli.command {
        Command::Shell => shell::run(&state).await,
        command => tokio::select! {
            outcome = commands::execute(&state, command) => outcome,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(ExitCode::from(130));
            }
        },
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            let (code, message) = e.describe();
            eprintln!("error [{code}]: {message}");
            Ok(ExitCode::FAILURE)
        }
    }
}
