//! givetrack - command-line client for fundraising events and donations.
//!
//! Logs in against the fundraising API, keeps the session between runs and
//! exposes events, donations and reports as subcommands.

mod app;
mod commands;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, SESSION_EXPIRED_MESSAGE};
use commands::{describe_error, is_session_expired, Cli};

/// Log file name inside `<cache dir>/logs`, rotated daily
const LOG_FILE_PREFIX: &str = "givetrack.log";

/// Initialize the tracing subscriber for logging.
///
/// Warnings go to stderr by default; `RUST_LOG` overrides the level. When a
/// cache directory is available a plain-text copy is also written to a
/// daily log file. The returned guard must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match givetrack_core::Config::default().cache_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir.join("logs"), LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _log_guard = init_tracing();
    info!("givetrack starting");

    let mut app = match App::new(cli.api_url.clone()).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = commands::run(&mut app, cli.command).await;

    // Reported once per run, however many requests failed
    let expired = app.take_session_expired();
    if expired {
        eprintln!("{}", SESSION_EXPIRED_MESSAGE);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "Command failed");
            if !(expired && is_session_expired(&e)) {
                eprintln!("Error: {}", describe_error(&e));
            }
            ExitCode::FAILURE
        }
    }
}
