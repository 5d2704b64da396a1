// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job and worker lifecycle administration (spec §4.2, §6): suspend, resume,
//! cancel, retry, delete, and priority changes for Jobs; enable, disable, and
//! delete for Workers; plus the read-only listing and introspection
//! endpoints. Each mutating call is a thin wrapper over [`Store`], emitting
//! the matching notification on the [`EventBus`] — one mutation, one event,
//! the same shape as [`crate::worker_protocol`].

use renderq_core::{Clock, Event, Job, JobId, JobStatus, Task, TaskStatus, Worker, WorkerId};
use renderq_plugins::{PluginInfo, PluginRegistry};
use renderq_store::{JobFilter, Store};
use tracing::info;

use crate::error::CoordinatorError;
use crate::events::EventBus;

pub fn list_jobs(store: &Store, status: Option<JobStatus>, limit: usize, offset: usize) -> Vec<Job> {
    store.list_jobs(JobFilter { status }, limit, offset)
}

pub fn get_job(store: &Store, id: &JobId) -> Result<Job, CoordinatorError> {
    store.get_job(id).ok_or(CoordinatorError::JobNotFound(*id))
}

pub fn get_job_tasks(store: &Store, id: &JobId) -> Result<Vec<Task>, CoordinatorError> {
    get_job(store, id)?;
    Ok(store.list_tasks_by_job(id))
}

/// Suspend a Job (spec §4.2 "queued/active -> suspended"). In-flight tasks
/// are released back to `pending` without a worker — only pending dispatch
/// pauses; a task a worker is already mid-flight on keeps running and the
/// next heartbeat-driven sweep reconciles it like any other in-flight work.
pub fn suspend_job(store: &Store, events: &EventBus, clock: &impl Clock, id: &JobId) -> Result<Job, CoordinatorError> {
    let now = clock.epoch_ms();
    let job = store.suspend_job(id, now)?;
    for task in store.list_tasks_by_job(id) {
        if task.status == TaskStatus::Assigned {
            store.release_task_to_pending(&task.id)?;
        }
    }
    info!(job_id = %job.id, "job suspended");
    events.publish(Event::JobSuspended { job_id: job.id, timestamp: now });
    Ok(job)
}

/// Resume a suspended Job. Always routes through `queued` — the next
/// successful pull promotes it back to `active` (spec §9 open question
/// resolution, mirrored by `Store::resume_job`).
pub fn resume_job(store: &Store, events: &EventBus, clock: &impl Clock, id: &JobId) -> Result<Job, CoordinatorError> {
    let now = clock.epoch_ms();
    let job = store.resume_job(id, now)?;
    info!(job_id = %job.id, "job resumed");
    events.publish(Event::JobResumed { job_id: job.id, timestamp: now });
    Ok(job)
}

/// Cancel a Job from any non-terminal status (spec §4.2 "any non-terminal ->
/// cancelled"). In-flight tasks are released the same way suspend releases
/// them; a worker mid-task simply finishes into a job that no longer cares.
pub fn cancel_job(store: &Store, events: &EventBus, clock: &impl Clock, id: &JobId) -> Result<Job, CoordinatorError> {
    let now = clock.epoch_ms();
    let job = store.cancel_job(id, now)?;
    for task in store.list_tasks_by_job(id) {
        if task.status == TaskStatus::Assigned {
            store.release_task_to_pending(&task.id)?;
        }
    }
    info!(job_id = %job.id, "job cancelled");
    events.publish(Event::JobCancelled { job_id: job.id, timestamp: now });
    Ok(job)
}

/// Retry a failed Job: its failed tasks reset to `pending` and it returns to
/// `queued` (spec §4.2 "failed -> queued"). No dedicated event — the job
/// re-enters the ordinary submitted/started/completed lifecycle from here.
pub fn retry_job(store: &Store, clock: &impl Clock, id: &JobId) -> Result<Job, CoordinatorError> {
    let now = clock.epoch_ms();
    let job = store.retry_job(id, now)?;
    info!(job_id = %job.id, "job retried");
    Ok(job)
}

/// Delete a terminal Job and cascade its tasks (spec §3 "deleted only when
/// status in {completed, cancelled, failed}").
pub fn delete_job(store: &Store, id: &JobId) -> Result<(), CoordinatorError> {
    store.delete_job(id)?;
    info!(job_id = %id, "job deleted");
    Ok(())
}

pub fn set_job_priority(store: &Store, id: &JobId, priority: i32) -> Result<Job, CoordinatorError> {
    Ok(store.set_job_priority(id, priority)?)
}

pub fn list_workers(store: &Store) -> Vec<Worker> {
    store.list_workers()
}

pub fn get_worker(store: &Store, id: &WorkerId) -> Result<Worker, CoordinatorError> {
    store.get_worker(id).ok_or(CoordinatorError::WorkerNotFound(*id))
}

pub fn enable_worker(store: &Store, id: &WorkerId) -> Result<Worker, CoordinatorError> {
    let worker = store.enable_worker(id)?;
    info!(worker_id = %worker.id, "worker enabled");
    Ok(worker)
}

pub fn disable_worker(store: &Store, id: &WorkerId) -> Result<Worker, CoordinatorError> {
    let worker = store.disable_worker(id)?;
    info!(worker_id = %worker.id, "worker disabled");
    Ok(worker)
}

pub fn delete_worker(store: &Store, id: &WorkerId) -> Result<(), CoordinatorError> {
    store.delete_worker(id)?;
    info!(worker_id = %id, "worker deleted");
    Ok(())
}

pub fn list_plugins(registry: &PluginRegistry) -> Vec<PluginInfo> {
    registry.list_info()
}

pub fn stats(store: &Store) -> renderq_store::StatsSnapshot {
    store.stats()
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
