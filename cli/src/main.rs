//! StudioFlow CLI - binary entry point.
//!
//! ```text
//! main() -> init_tracing() -> StudioFlowConfig -> Client -> commands::execute()
//!                                                   |
//!                                                   v
//!                                   login-required watcher (stderr notice)
//! ```
//!
//! Logs go to `~/.studioflow/logs/studioflow.log`; stdout carries only JSON results.

mod commands;

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use studioflow_client::{
    Client, ClientOptions, LoginRequiredReason, SessionEvent, SessionStore,
};
use studioflow_config::StudioFlowConfig;

#[derive(Parser)]
#[command(name = "studioflow", version)]
#[command(about = "Talk to the StudioFlow backend from the command line")]
struct Cli {
    /// Backend origin (overrides config and STUDIOFLOW_API_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: commands::Command,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than mixing logs into JSON output.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.studioflow/logs/studioflow.log
    if let Some(config_dir) = studioflow_config::config_dir() {
        candidates.push(config_dir.join("logs").join("studioflow.log"));
    }

    // Fallback: ./.studioflow/logs/studioflow.log
    candidates.push(
        PathBuf::from(".studioflow")
            .join("logs")
            .join("studioflow.log"),
    );

    candidates
}

fn build_client(config: &StudioFlowConfig, base_url: Option<String>) -> Result<Client> {
    let base_url = match base_url {
        Some(url) => url,
        None => config.base_url(),
    };
    let options = ClientOptions::new(&base_url)?
        .with_request_timeout(config.request_timeout())
        .with_connect_timeout(config.connect_timeout())
        .with_logout_path(config.logout_path());

    let store = match config.session_file() {
        Some(path) => SessionStore::open(path),
        None => SessionStore::in_memory(),
    };

    Client::new(options, Arc::new(store)).context("failed to build API client")
}

/// Print a notice whenever the backend rejects the session.
async fn watch_login_required(mut rx: broadcast::Receiver<SessionEvent>) {
    loop {
        match rx.recv().await {
            Ok(SessionEvent::LoginRequired(LoginRequiredReason::Unauthorized { path })) => {
                tracing::info!(%path, "Backend rejected the session");
                eprintln!("Session expired; run 'studioflow login'");
            }
            Ok(SessionEvent::LoginRequired(LoginRequiredReason::LoggedOut)) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Login-required watcher lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match StudioFlowConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Ignoring unreadable config {}: {e}", e.path().display());
            StudioFlowConfig::default()
        }
    };

    let client = build_client(&config, cli.base_url)?;
    let watcher = tokio::spawn(watch_login_required(client.subscribe()));

    let result = commands::execute(&client, cli.command).await;

    // Closing the last sender lets the watcher drain and exit.
    drop(client);
    if let Err(e) = watcher.await {
        tracing::warn!("Login-required watcher failed: {e}");
    }

    result
}
