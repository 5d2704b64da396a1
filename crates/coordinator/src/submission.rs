// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The submission path (spec §4.7): validate, partition, persist, emit. Six
//! steps, each fallible; a failure at partitioning or task persistence must
//! not leave a dangling Job row behind.

use renderq_core::{Clock, Event, Job, JobId, JobStatus};
use renderq_plugins::PluginRegistry;
use renderq_store::Store;
use tracing::{info, warn};

use crate::error::CoordinatorError;
use crate::events::EventBus;

/// Inputs to a submission, mirroring `Request::SubmitJob` (spec §6).
pub struct SubmitJobParams {
    pub name: String,
    pub plugin: String,
    pub priority: Option<i32>,
    pub pool: Option<String>,
    pub plugin_data: renderq_core::Payload,
    pub metadata: renderq_core::Payload,
    pub dependent_on: Vec<JobId>,
}

/// Submit a Job: validate against its plugin, partition into Tasks, and
/// persist both atomically from the caller's point of view (spec §4.7).
///
/// 1. look up the plugin, rejecting an unknown name
/// 2. validate the submitted parameters against it
/// 3. construct the Job in `pending` and persist it
/// 4. partition it into Tasks via the plugin
/// 5. persist the Tasks and transition the Job to `queued`
/// 6. emit `job.submitted`
///
/// If step 4 or 5 fails, the Job row is deleted before returning the error —
/// callers never observe a submission as "half landed".
pub fn submit_job(
    store: &Store,
    registry: &PluginRegistry,
    events: &EventBus,
    clock: &impl Clock,
    params: SubmitJobParams,
) -> Result<Job, CoordinatorError> {
    let plugin = registry.get(&params.plugin).ok_or_else(|| CoordinatorError::UnknownPlugin(params.plugin.clone()))?;

    plugin.validate(&params.plugin_data).map_err(CoordinatorError::ValidationFailed)?;

    let now = clock.epoch_ms();
    let mut job = Job::new(
        params.name,
        params.plugin,
        params.priority.unwrap_or(renderq_core::job::DEFAULT_PRIORITY),
        params.pool.unwrap_or_else(|| renderq_core::job::DEFAULT_POOL.to_string()),
        params.plugin_data,
        params.dependent_on,
        params.metadata,
        now,
    )?;
    store.add_job(job.clone())?;

    match partition_and_persist(store, plugin, &job) {
        Ok(task_total) => {
            job.counts.task_total = task_total;
            job.transition_to(JobStatus::Queued, now)?;
            store.update_job(job.clone())?;
            info!(job_id = %job.id, plugin = %job.plugin, tasks = task_total, "job submitted");
            events.publish(Event::JobSubmitted { job_id: job.id, timestamp: now });
            Ok(job)
        }
        Err(reason) => {
            warn!(job_id = %job.id, %reason, "partitioning failed, discarding job");
            if let Err(e) = store.delete_job(&job.id) {
                warn!(job_id = %job.id, error = %e, "failed to discard job after partition failure");
            }
            Err(CoordinatorError::PartitionFailed(reason))
        }
    }
}

fn partition_and_persist(store: &Store, plugin: &dyn renderq_plugins::Plugin, job: &Job) -> Result<u32, String> {
    let tasks = plugin.create_tasks(job).map_err(|e| e.to_string())?;
    let task_total = tasks.len() as u32;
    store.add_tasks(tasks).map_err(|e| e.to_string())?;
    Ok(task_total)
}

#[cfg(test)]
#[path = "submission_tests.rs"]
mod tests;
