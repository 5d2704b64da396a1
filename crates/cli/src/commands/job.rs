// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Args, Subcommand};
use renderq_core::{JobId, JobStatus};
use renderq_wire::{Request, Response};

use crate::client::CoordinatorClient;
use crate::exit_error::ExitError;
use crate::output::{self, OutputFormat};

use super::parse_payload;

#[derive(Debug, Subcommand)]
pub enum JobCommand {
    /// Submit a new job to a plugin.
    Submit(SubmitArgs),
    /// List jobs, optionally filtered.
    List(ListArgs),
    /// Show full detail for one job, including its tasks.
    Show { id: String },
    /// Cancel a job that has not reached a terminal status.
    Cancel { id: String },
    /// Suspend a pending or queued job.
    Suspend { id: String },
    /// Resume a suspended job.
    Resume { id: String },
    /// Reset a failed job's failed tasks to pending and retry it.
    Retry { id: String },
    /// Delete a job's record. Refuses while the job is still active.
    Delete { id: String },
    /// Change a job's queue priority.
    Priority { id: String, priority: i32 },
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Human-readable job name.
    #[arg(long)]
    pub name: String,
    /// Plugin to run the job through, e.g. `aftereffects` or `ffmpeg`.
    #[arg(long)]
    pub plugin: String,
    /// Queue priority; higher runs first among otherwise-eligible jobs.
    #[arg(long)]
    pub priority: Option<i32>,
    /// Worker pool this job is restricted to.
    #[arg(long)]
    pub pool: Option<String>,
    /// Plugin-specific parameter, repeatable: `--data key=value`.
    #[arg(long = "data", value_name = "KEY=VALUE")]
    pub data: Vec<String>,
    /// Free-form metadata, repeatable: `--meta key=value`.
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,
    /// Job IDs this job must wait on before it becomes eligible to run.
    #[arg(long = "depends-on", value_name = "JOB_ID")]
    pub depends_on: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub pool: Option<String>,
    #[arg(long)]
    pub plugin: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
}

pub async fn run(client: &CoordinatorClient, format: OutputFormat, command: JobCommand) -> Result<(), ExitError> {
    match command {
        JobCommand::Submit(args) => submit(client, format, args).await,
        JobCommand::List(args) => list(client, format, args).await,
        JobCommand::Show { id } => show(client, format, id).await,
        JobCommand::Cancel { id } => simple(client, format, Request::CancelJob { id: JobId::from_string(id) }).await,
        JobCommand::Suspend { id } => simple(client, format, Request::SuspendJob { id: JobId::from_string(id) }).await,
        JobCommand::Resume { id } => simple(client, format, Request::ResumeJob { id: JobId::from_string(id) }).await,
        JobCommand::Retry { id } => simple(client, format, Request::RetryJob { id: JobId::from_string(id) }).await,
        JobCommand::Delete { id } => delete(client, id).await,
        JobCommand::Priority { id, priority } => {
            simple(client, format, Request::SetJobPriority { id: JobId::from_string(id), priority }).await
        }
    }
}

async fn submit(client: &CoordinatorClient, format: OutputFormat, args: SubmitArgs) -> Result<(), ExitError> {
    let plugin_data = parse_payload(&args.data)?;
    let metadata = parse_payload(&args.meta)?;
    let dependent_on = args.depends_on.into_iter().map(JobId::from_string).collect();
    let request = Request::SubmitJob {
        name: args.name,
        plugin: args.plugin,
        priority: args.priority,
        pool: args.pool,
        plugin_data,
        metadata,
        dependent_on,
    };
    match client.send_checked(request).await.map_err(ExitError::from_err)? {
        Response::Job { job } => {
            output::print_job_detail(format, &job);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

async fn list(client: &CoordinatorClient, format: OutputFormat, args: ListArgs) -> Result<(), ExitError> {
    let status = args.status.map(|s| parse_status(&s)).transpose()?;
    let request = Request::ListJobs { pool: args.pool, status, plugin: args.plugin };
    match client.send_checked(request).await.map_err(ExitError::from_err)? {
        Response::Jobs { jobs } => {
            output::print_job_summaries(format, &jobs);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

async fn show(client: &CoordinatorClient, format: OutputFormat, id: String) -> Result<(), ExitError> {
    match client.send_checked(Request::GetJob { id: JobId::from_string(id) }).await.map_err(ExitError::from_err)? {
        Response::Job { job } => {
            output::print_job_detail(format, &job);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

async fn delete(client: &CoordinatorClient, id: String) -> Result<(), ExitError> {
    let id = JobId::from_string(id);
    match client.send_checked(Request::DeleteJob { id }).await.map_err(ExitError::from_err)? {
        Response::JobDeleted { id } => {
            println!("deleted {id}");
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

async fn simple(client: &CoordinatorClient, format: OutputFormat, request: Request) -> Result<(), ExitError> {
    match client.send_checked(request).await.map_err(ExitError::from_err)? {
        Response::Job { job } => {
            output::print_job_detail(format, &job);
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

fn parse_status(raw: &str) -> Result<JobStatus, ExitError> {
    let quoted = format!("\"{raw}\"");
    serde_json::from_str(&quoted).map_err(|_| ExitError::new(2, format!("unknown job status: {raw}")))
}

fn unexpected(response: Response) -> ExitError {
    ExitError::new(1, format!("unexpected response from coordinator: {response:?}"))
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
