// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker agent protocol (spec §4.8): register, heartbeat, pull, and
//! task lifecycle reporting. Each handler does exactly one Store mutation
//! and emits the matching notification on the [`EventBus`] — Job-level
//! progress aggregation and completion are the Scheduler's job, not this
//! module's (spec §4.4b).

use renderq_core::{fingerprint, Clock, Event, Task, TaskId, Worker, WorkerId};
use renderq_store::{Store, WorkerTelemetry};
use tracing::debug;

use crate::error::CoordinatorError;
use crate::events::EventBus;

pub struct RegisterParams {
    pub hostname: String,
    pub mac_address: String,
    pub ip_address: String,
    pub pools: Vec<String>,
    pub capabilities: Vec<String>,
    pub cpu_cores: u32,
    pub memory_total_mb: u64,
    pub version: String,
}

/// Register (or re-register) a worker under its stable fingerprint (spec
/// §4.8 "Register" — idempotent).
pub fn register_worker(
    store: &Store,
    events: &EventBus,
    clock: &impl Clock,
    params: RegisterParams,
) -> Result<Worker, CoordinatorError> {
    let id = fingerprint(&params.hostname, &params.mac_address);
    let now = clock.epoch_ms();
    let worker = Worker::register(
        id,
        params.hostname.clone(),
        params.hostname,
        params.ip_address,
        params.pools,
        params.capabilities,
        params.cpu_cores,
        params.memory_total_mb,
        params.version,
        now,
    );
    store.upsert_worker(worker.clone())?;
    debug!(worker_id = %worker.id, "worker registered");
    events.publish(Event::WorkerConnected { worker_id: worker.id, timestamp: now });
    Ok(worker)
}

pub fn heartbeat(
    store: &Store,
    events: &EventBus,
    clock: &impl Clock,
    worker_id: &WorkerId,
    cpu_usage_pct: f64,
    memory_used_mb: u64,
) -> Result<Worker, CoordinatorError> {
    let now = clock.epoch_ms();
    let telemetry = WorkerTelemetry { cpu_usage_pct, memory_used_mb };
    let worker = store.update_worker_heartbeat(worker_id, telemetry, now)?;
    events.publish(Event::WorkerHeartbeat { worker_id: worker.id, timestamp: now });
    Ok(worker)
}

/// Hand the next eligible Task to `worker_id`, if any (spec §4.3, §4.8
/// "Pull").
pub fn pull_task(store: &Store, events: &EventBus, clock: &impl Clock, worker_id: &WorkerId) -> Result<Option<Task>, CoordinatorError> {
    let now = clock.epoch_ms();
    let task = store.next_task_for_worker(worker_id, now)?;
    if let Some(task) = &task {
        events.publish(Event::TaskAssigned { task_id: task.id, job_id: task.job_id, worker_id: *worker_id, timestamp: now });
        // `next_task_for_worker` transitions a queued Job to active as part
        // of the same transaction when this is its first assignment; a
        // `started_at` that equals this call's `now` is that transition.
        if let Some(job) = store.get_job(&task.job_id) {
            if job.started_at == Some(now) {
                events.publish(Event::JobStarted { job_id: job.id, timestamp: now });
            }
        }
    }
    Ok(task)
}

pub fn start_task(store: &Store, events: &EventBus, clock: &impl Clock, task_id: &TaskId) -> Result<Task, CoordinatorError> {
    let now = clock.epoch_ms();
    let task = store.start_task(task_id, now)?;
    events.publish(Event::TaskStarted { task_id: task.id, job_id: task.job_id, timestamp: now });
    Ok(task)
}

pub fn report_progress(store: &Store, events: &EventBus, clock: &impl Clock, task_id: &TaskId, progress: f64) -> Result<Task, CoordinatorError> {
    let task = store.set_task_progress(task_id, progress)?;
    events.publish(Event::TaskProgress { task_id: task.id, job_id: task.job_id, progress: task.progress, timestamp: clock.epoch_ms() });
    Ok(task)
}

pub fn complete_task(store: &Store, events: &EventBus, clock: &impl Clock, task_id: &TaskId, exit_code: i32) -> Result<Task, CoordinatorError> {
    let now = clock.epoch_ms();
    let task = store.complete_task(task_id, exit_code, now)?;
    events.publish(Event::TaskCompleted { task_id: task.id, job_id: task.job_id, timestamp: now });
    Ok(task)
}

pub fn fail_task(
    store: &Store,
    events: &EventBus,
    clock: &impl Clock,
    task_id: &TaskId,
    exit_code: Option<i32>,
    error_message: String,
) -> Result<Task, CoordinatorError> {
    let now = clock.epoch_ms();
    let task = store.fail_task(task_id, exit_code, error_message.clone(), now)?;
    events.publish(Event::TaskFailed { task_id: task.id, job_id: task.job_id, error_message, timestamp: now });
    Ok(task)
}

/// Record the worker-local path a task's output log was written to (spec
/// §4.8 "log upload" — the coordinator stores the path, not the bytes).
pub fn upload_task_log(store: &Store, task_id: &TaskId, log_path: String) -> Result<Task, CoordinatorError> {
    let mut task = store.get_task(task_id).ok_or(CoordinatorError::TaskNotFound(*task_id))?;
    task.log_path = Some(log_path);
    store.update_task(task.clone())?;
    Ok(task)
}

#[cfg(test)]
#[path = "worker_protocol_tests.rs"]
mod tests;
