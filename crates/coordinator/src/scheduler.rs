// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic control loop (spec §4.4): heartbeat timeout sweep, job
//! progress aggregation, terminal-status transitions, and follow-up job
//! creation. Dispatch itself never happens here — that is
//! [`crate::worker_protocol::pull_task`]'s atomic transaction; the scheduler
//! only reconciles state that no single Store call already keeps consistent.

use renderq_core::{Clock, Event, Job, JobStatus, TaskStatus, WorkerStatus};
use renderq_plugins::PluginRegistry;
use renderq_store::{JobFilter, Store};
use tokio::time::Duration;
use tracing::{error, info, warn};

use crate::events::EventBus;
use crate::submission::{self, SubmitJobParams};

/// Counts of what one `run_tick` did, logged at `info` when anything moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub workers_timed_out: u32,
    pub jobs_completed: u32,
    pub jobs_failed: u32,
    pub followups_created: u32,
}

impl TickSummary {
    fn is_quiet(&self) -> bool {
        *self == Self::default()
    }
}

/// Run one scheduler pass (spec §4.4a/b): sweep timed-out workers, then
/// aggregate progress for every active job, completing or failing it once
/// every task has reached a terminal status.
pub fn run_tick(store: &Store, registry: &PluginRegistry, events: &EventBus, clock: &impl Clock, worker_timeout_secs: u64) -> TickSummary {
    let now = clock.epoch_ms();
    let mut summary = TickSummary::default();

    sweep_timed_out_workers(store, events, clock, worker_timeout_secs, &mut summary);

    for job in store.list_jobs(JobFilter { status: Some(JobStatus::Active) }, usize::MAX, 0) {
        reconcile_job(store, registry, events, clock, now, &job, &mut summary);
    }

    if !summary.is_quiet() {
        info!(
            workers_timed_out = summary.workers_timed_out,
            jobs_completed = summary.jobs_completed,
            jobs_failed = summary.jobs_failed,
            followups_created = summary.followups_created,
            "scheduler tick"
        );
    }
    summary
}

/// Spawn `run_tick` on a `tokio::time::interval`, running until the process
/// exits. Errors inside a single tick are caught and logged; the loop itself
/// never stops (spec §7 "the scheduler loop catches and logs, then continues").
pub fn spawn(store: Store, registry: std::sync::Arc<PluginRegistry>, events: EventBus, clock: impl Clock + 'static, tick_interval_ms: u64, worker_timeout_secs: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(tick_interval_ms));
        loop {
            interval.tick().await;
            run_tick(&store, &registry, &events, &clock, worker_timeout_secs);
        }
    })
}

fn sweep_timed_out_workers(store: &Store, events: &EventBus, clock: &impl Clock, worker_timeout_secs: u64, summary: &mut TickSummary) {
    let now = clock.epoch_ms();
    for worker in store.list_workers() {
        if worker.status == WorkerStatus::Offline || worker.status == WorkerStatus::Disabled {
            continue;
        }
        if !worker.timed_out(now, worker_timeout_secs) {
            continue;
        }
        match store.mark_worker_offline(&worker.id) {
            Ok(released) => {
                summary.workers_timed_out += 1;
                warn!(worker_id = %worker.id, timeout_secs = worker_timeout_secs, "worker heartbeat timed out, marking offline");
                events.publish(Event::WorkerDisconnected { worker_id: worker.id, timestamp: now });
                if let Some(task_id) = released {
                    warn!(worker_id = %worker.id, task_id = %task_id, "released in-flight task back to pending");
                }
            }
            Err(e) => error!(worker_id = %worker.id, error = %e, "failed to mark timed-out worker offline"),
        }
    }
}

/// Recompute one active job's aggregate counts and progress; transition it
/// to a terminal status once every task has finished, then fan out any
/// follow-up jobs the plugin declares (spec §4.4b, §4.5).
fn reconcile_job(store: &Store, registry: &PluginRegistry, events: &EventBus, clock: &impl Clock, now: u64, job: &Job, summary: &mut TickSummary) {
    let tasks = store.list_tasks_by_job(&job.id);
    let total = job.counts.task_total.max(tasks.len() as u32);
    if total == 0 {
        return;
    }
    let completed = tasks.iter().filter(|t| t.status == TaskStatus::Completed).count() as u32;
    let failed = tasks.iter().filter(|t| t.status == TaskStatus::Failed).count() as u32;
    let running_progress: f64 = tasks.iter().filter(|t| t.status == TaskStatus::Running).map(|t| t.progress).sum();
    let progress = ((completed as f64) * 100.0 + running_progress) / total as f64;

    let mut updated = job.clone();
    updated.counts.task_completed = completed;
    updated.counts.task_failed = failed;
    updated.progress = progress;

    if completed + failed < total {
        if let Err(e) = store.update_job(updated) {
            error!(job_id = %job.id, error = %e, "failed to persist job progress");
            return;
        }
        events.publish(Event::JobProgress { job_id: job.id, progress, timestamp: now });
        return;
    }

    if failed == 0 {
        if let Err(e) = updated.transition_to(JobStatus::Completed, now) {
            error!(job_id = %job.id, error = %e, "failed to complete job");
            return;
        }
        if let Err(e) = store.update_job(updated) {
            error!(job_id = %job.id, error = %e, "failed to persist completed job");
            return;
        }
        summary.jobs_completed += 1;
        info!(job_id = %job.id, "job completed");
        events.publish(Event::JobCompleted { job_id: job.id, timestamp: now });

        let created = create_followups(store, registry, events, clock, job);
        summary.followups_created += created;
    } else {
        let message = format!("{failed} of {total} task(s) failed");
        updated.error_message = Some(message.clone());
        if let Err(e) = updated.transition_to(JobStatus::Failed, now) {
            error!(job_id = %job.id, error = %e, "failed to fail job");
            return;
        }
        if let Err(e) = store.update_job(updated) {
            error!(job_id = %job.id, error = %e, "failed to persist failed job");
            return;
        }
        summary.jobs_failed += 1;
        warn!(job_id = %job.id, %message, "job failed");
        events.publish(Event::JobFailed { job_id: job.id, error_message: message, timestamp: now });
    }
}

/// Ask `job`'s plugin for follow-up descriptors and submit each as a new job
/// dependent on `job` (spec §4.5, SPEC_FULL §6 "multi-format follow-up
/// fan-out"). A failure submitting one descriptor is logged and skipped —
/// it never unwinds the job whose completion triggered it.
fn create_followups(store: &Store, registry: &PluginRegistry, events: &EventBus, clock: &impl Clock, job: &Job) -> u32 {
    let Some(plugin) = registry.get(&job.plugin) else {
        return 0;
    };
    plugin.on_job_complete(job);

    let mut created = 0;
    for descriptor in plugin.get_encoding_jobs(job) {
        let params = SubmitJobParams {
            name: descriptor.name,
            plugin: descriptor.plugin,
            priority: descriptor.priority,
            pool: descriptor.pool,
            plugin_data: descriptor.plugin_data,
            metadata: descriptor.metadata,
            dependent_on: vec![job.id],
        };
        match submission::submit_job(store, registry, events, clock, params) {
            Ok(followup) => {
                created += 1;
                info!(job_id = %job.id, followup_id = %followup.id, "follow-up job created");
            }
            Err(e) => warn!(job_id = %job.id, error = %e, "follow-up job submission failed"),
        }
    }
    created
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
