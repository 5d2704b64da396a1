// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Subcommand;
use renderq_wire::{Request, Response};

use crate::client::CoordinatorClient;
use crate::exit_error::ExitError;
use crate::output::{self, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum PluginCommand {
    /// List every plugin registered with the coordinator.
    List,
}

pub async fn run(client: &CoordinatorClient, format: OutputFormat, command: PluginCommand) -> Result<(), ExitError> {
    let PluginCommand::List = command;
    match client.send_checked(Request::ListPlugins).await.map_err(ExitError::from_err)? {
        Response::Plugins { plugins } => {
            output::print_plugins(format, &plugins);
            Ok(())
        }
        other => Err(ExitError::new(1, format!("unexpected response from coordinator: {other:?}"))),
    }
}
