// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `renderq-coordinatord`: the control-plane daemon. Parses flags, loads
//! `renderq.toml`, opens the durable store, and runs the socket listener and
//! scheduler tick until the process is killed.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use renderq_core::SystemClock;
use renderq_coordinator::{ConfigOverrides, CoordinatorCtx, EventBus, Listener, RenderqConfig};
use renderq_store::Store;
use tokio::net::{TcpListener, UnixListener};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// RenderQ control-plane daemon.
#[derive(Debug, Parser)]
#[command(name = "renderq-coordinatord", version)]
struct Args {
    /// Path to a `renderq.toml` file. Defaults to `./renderq.toml` if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// TCP address to bind, e.g. `0.0.0.0:7420`.
    #[arg(long)]
    bind: Option<String>,

    /// Path to a Unix-domain socket to additionally listen on. Pass an empty
    /// string to disable the Unix listener entirely.
    #[arg(long)]
    unix_socket: Option<String>,

    /// Directory holding the WAL and snapshot files.
    #[arg(long)]
    data_dir: Option<String>,

    /// Scheduler tick interval, in milliseconds.
    #[arg(long)]
    tick_interval_ms: Option<u64>,

    /// Seconds of silence before a worker is marked offline.
    #[arg(long)]
    worker_timeout_secs: Option<u64>,

    /// `tracing` filter directive, e.g. `info` or `renderq_coordinator=debug`.
    #[arg(long)]
    log_level: Option<String>,

    /// Append-only log file. Logs go to stderr only when unset.
    #[arg(long)]
    log_file: Option<String>,
}

impl From<&Args> for ConfigOverrides {
    fn from(args: &Args) -> Self {
        Self {
            bind: args.bind.clone(),
            unix_socket: args.unix_socket.clone(),
            data_dir: args.data_dir.clone(),
            tick_interval_ms: args.tick_interval_ms,
            worker_timeout_secs: args.worker_timeout_secs,
            log_level: args.log_level.clone(),
            log_file: args.log_file.clone(),
        }
    }
}

fn init_logging(level: &str, log_file: Option<&std::path::Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "renderq-coordinatord.log".into());
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(non_blocking).with_ansi(false).init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let overrides = ConfigOverrides::from(&args);
    let config = RenderqConfig::load(args.config.as_deref(), &overrides)?;

    // Keep the guard alive for the process lifetime so buffered log lines flush.
    let _log_guard = init_logging(&config.log_level, config.log_file.as_deref());

    info!(bind = %config.bind, unix_socket = ?config.unix_socket, data_dir = %config.data_dir.display(), "starting renderq-coordinatord");

    if let Some(parent) = config.data_dir.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::create_dir_all(&config.data_dir)?;

    let snapshot_path = config.data_dir.join("snapshot.zst");
    let wal_path = config.data_dir.join("wal.log");
    let store = Store::open_with_snapshot(&snapshot_path, &wal_path)?;

    let registry = Arc::new(renderq_plugins::reference_registry());
    let events = EventBus::new();
    let clock = SystemClock;

    let _scheduler = renderq_coordinator::scheduler::spawn(
        store.clone(),
        Arc::clone(&registry),
        events.clone(),
        clock.clone(),
        config.tick_interval_ms,
        config.worker_timeout_secs,
    );

    let tcp = TcpListener::bind(&config.bind).await?;
    info!(addr = %config.bind, "tcp listener bound");

    let unix = match &config.unix_socket {
        Some(path) => {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let listener = UnixListener::bind(path)?;
            info!(path = %path.display(), "unix listener bound");
            Some(listener)
        }
        None => {
            warn!("no unix socket configured, accepting tcp connections only");
            None
        }
    };

    let ctx = CoordinatorCtx { store, registry, events, clock };
    Listener::new(tcp, unix, ctx).run().await;
    Ok(())
}
