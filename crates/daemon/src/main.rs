// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! trackerd: usage-tracking and job-orchestration daemon. Wires the store,
//! ingestor, job service, executor, and scheduler together and runs them
//! until a shutdown signal arrives.

use std::io::Write;

use fs2::FileExt;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use trackerd::{Config, Daemon};
use trk_core::pricing::{zero_pricing, AllowAll};
use trk_core::SystemClock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("trackerd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("trackerd {}", env!("CARGO_PKG_VERSION"));
                println!("Usage-tracking and job-orchestration daemon.");
                println!("Reads its configuration from the environment; see the crate docs.");
                return Ok(());
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;

    let _lock_file = acquire_lock(&config)?;
    let _log_guard = setup_logging(&config)?;

    info!("starting trackerd");

    let mut daemon = match Daemon::start(config.clone(), SystemClock, std::sync::Arc::new(AllowAll), zero_pricing()).await {
        Ok(daemon) => daemon,
        Err(err) => {
            error!(error = %err, "failed to start daemon");
            return Err(err.into());
        }
    };

    info!(worker_count = config.worker_count, log_root = %config.log_root.display(), "trackerd ready");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    if let Err(err) = daemon.shutdown().await {
        error!(error = %err, "error during shutdown");
    }
    info!("trackerd stopped");
    Ok(())
}

fn acquire_lock(config: &Config) -> std::io::Result<std::fs::File> {
    let mut lock_file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::AlreadyExists, "trackerd is already running")
    })?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    Ok(lock_file)
}

fn setup_logging(config: &Config) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().unwrap_or(&config.state_dir),
        config.log_path.file_name().unwrap_or_default(),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}
