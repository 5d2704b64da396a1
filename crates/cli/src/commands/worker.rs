// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Subcommand;
use renderq_core::WorkerId;
use renderq_wire::{Request, Response};

use crate::client::CoordinatorClient;
use crate::exit_error::ExitError;
use crate::output::{self, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum WorkerCommand {
    /// List every known worker.
    List,
    /// Show detail for one worker.
    Show { id: String },
    /// Stop dispatching new tasks to a worker without disconnecting it.
    Disable { id: String },
    /// Re-allow dispatch to a previously disabled worker.
    Enable { id: String },
    /// Forget a worker's record. Refuses while it is busy.
    Delete { id: String },
}

pub async fn run(client: &CoordinatorClient, format: OutputFormat, command: WorkerCommand) -> Result<(), ExitError> {
    match command {
        WorkerCommand::List => list(client, format).await,
        WorkerCommand::Show { id } => show(client, format, id).await,
        WorkerCommand::Disable { id } => toggle(client, format, Request::DisableWorker { id: WorkerId::from_string(id) }).await,
        WorkerCommand::Enable { id } => toggle(client, format, Request::EnableWorker { id: WorkerId::from_string(id) }).await,
        WorkerCommand::Delete { id } => delete(client, id).await,
    }
}

async fn list(client: &CoordinatorClient, format: OutputFormat) -> Result<(), ExitError> {
    match client.send_checked(Request::ListWorkers).await.map_err(ExitError::from_err)? {
        Response::Workers { workers } => {
            output::print_workers(format, &workers);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

async fn show(client: &CoordinatorClient, format: OutputFormat, id: String) -> Result<(), ExitError> {
    match client.send_checked(Request::GetWorker { id: WorkerId::from_string(id) }).await.map_err(ExitError::from_err)? {
        Response::Worker { worker } => {
            output::print_worker(format, &worker);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

async fn toggle(client: &CoordinatorClient, format: OutputFormat, request: Request) -> Result<(), ExitError> {
    match client.send_checked(request).await.map_err(ExitError::from_err)? {
        Response::Worker { worker } => {
            output::print_worker(format, &worker);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

async fn delete(client: &CoordinatorClient, id: String) -> Result<(), ExitError> {
    let id = WorkerId::from_string(id);
    match client.send_checked(Request::DeleteWorker { id }).await.map_err(ExitError::from_err)? {
        Response::WorkerDeleted { id } => {
            println!("deleted {id}");
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

fn unexpected(response: Response) -> ExitError {
    ExitError::new(1, format!("unexpected response from coordinator: {response:?}"))
}
