// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `renderq`: thin CLI client for `renderq-coordinatord` (spec §6). Every
//! subcommand opens one connection, sends one request, prints the reply,
//! and exits — no local state.

mod client;
mod commands;
mod exit_error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use client::{CoordinatorClient, Endpoint};
use commands::job::JobCommand;
use commands::plugin::PluginCommand;
use commands::worker::WorkerCommand;
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "renderq", version, about = "RenderQ render farm client")]
struct Cli {
    /// Coordinator TCP address, e.g. `127.0.0.1:7420`.
    #[arg(long, global = true, env = "RENDERQ_HOST", default_value = "127.0.0.1:7420")]
    host: String,

    /// Connect over a Unix-domain socket instead of TCP.
    #[arg(long, global = true, env = "RENDERQ_SOCKET")]
    socket: Option<PathBuf>,

    /// Output format for commands that print data.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Submit, list, inspect, and manage render jobs.
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },
    /// List and administer render workers.
    Worker {
        #[command(subcommand)]
        command: WorkerCommand,
    },
    /// Inspect registered plugins and their parameters.
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },
    /// Show coordinator-wide aggregate counters.
    Stats,
    /// Liveness check against the coordinator.
    Ping,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.code.clamp(0, 255) as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let client = CoordinatorClient::new(Endpoint::from_args(&cli.host, &cli.socket));
    match cli.command {
        Commands::Job { command } => commands::job::run(&client, cli.format, command).await,
        Commands::Worker { command } => commands::worker::run(&client, cli.format, command).await,
        Commands::Plugin { command } => commands::plugin::run(&client, cli.format, command).await,
        Commands::Stats => commands::stats::run(&client, cli.format).await,
        Commands::Ping => match client.send(renderq_wire::Request::Ping).await.map_err(ExitError::from_err)? {
            renderq_wire::Response::Pong => {
                println!("pong");
                Ok(())
            }
            other => Err(ExitError::new(1, format!("unexpected response from coordinator: {other:?}"))),
        },
    }
}
