// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ferry Daemon (ferryd)
//!
//! Foreground process that launches one cluster application and supervises
//! it until the application completes or the daemon is told to stop.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod lifecycle;

use std::path::PathBuf;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::lifecycle::{Config, DaemonLauncher, LifecycleError};

const USAGE: &str = "Usage: ferryd [--help | --version] [CONFIG]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_arg = match std::env::args().nth(1) {
        Some(arg) => match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("ferryd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("ferryd {}", env!("CARGO_PKG_VERSION"));
                println!("Ferry Daemon - launches and supervises one cluster application");
                println!();
                println!("USAGE:");
                println!("    ferryd [CONFIG]");
                println!();
                println!("CONFIG is the launcher config file (TOML). When omitted, the");
                println!("path is read from {}.", env::CONFIG_ENV);
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            flag if flag.starts_with('-') => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("{USAGE}");
                std::process::exit(1);
            }
            path => Some(PathBuf::from(path)),
        },
        None => None,
    };

    let config = match Config::load(config_arg) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    // Write startup marker to log (before tracing setup)
    write_startup_marker(&config)?;

    let log_guard = setup_logging(&config)?;

    info!("Starting daemon");

    let mut daemon = match lifecycle::startup(&config) {
        Ok(daemon) => daemon,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("ferryd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let launcher = daemon.launcher.clone();
    if let Err(e) = launcher.start().await {
        error!("Failed to start launcher: {}", e);
        if let Err(stop_err) = launcher.stop().await {
            error!("Failed to stop launcher after start failure: {}", stop_err);
        }
        daemon.shutdown();
        drop(log_guard);
        return Err(e.into());
    }

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        application_id = ?launcher.application_id().map(|id| id.to_string()),
        "Daemon ready"
    );

    let signalled = tokio::select! {
        _ = launcher.wait_stopped() => {
            info!("Launcher stopped, exiting...");
            false
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
            true
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
            true
        }
    };

    shutdown_launcher(&launcher, signalled).await;

    daemon.shutdown();
    info!("Daemon stopped");
    Ok(())
}

/// Stop the launcher and wait for its event handler to drain.
///
/// A signal-driven shutdown has no final report, so the notification goes
/// out with the `Not available` body even when the stop itself failed. A
/// report-driven notification that raced the signal wins.
async fn shutdown_launcher(launcher: &DaemonLauncher, signalled: bool) {
    if let Err(e) = launcher.stop().await {
        error!("Launcher stopped with error: {}", e);
    }
    launcher.wait_stopped().await;
    if signalled {
        launcher.notify_shutdown(None).await;
    }
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- ferryd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- ferryd: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
