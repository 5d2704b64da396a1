// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state: the three entity tables plus the indexes the hot
//! paths need (spec §4.1 "Indexes required by hot paths").

use renderq_core::{Job, JobId, JobStatus, Task, TaskId, TaskStatus, Worker, WorkerId, WorkerStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::wal::WalEntry;

/// Optional filter for `list_jobs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
}

/// Cardinalities grouped by status (spec §4.1 `stats()`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsSnapshot {
    pub jobs_by_status: HashMap<String, u64>,
    pub tasks_by_status: HashMap<String, u64>,
    pub workers_by_status: HashMap<String, u64>,
}

/// Telemetry reported on a worker heartbeat (spec §4.8).
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerTelemetry {
    pub cpu_usage_pct: f64,
    pub memory_used_mb: u64,
}

/// In-memory projection of every Job, Task and Worker. Rebuilt from a
/// snapshot plus WAL replay on startup; mutated only through [`crate::Store`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub jobs: HashMap<JobId, Job>,
    pub tasks: HashMap<TaskId, Task>,
    pub workers: HashMap<WorkerId, Worker>,
    /// job_id -> ordered task ids (by index), maintained incrementally so
    /// `list_tasks_by_job` doesn't need a full scan.
    tasks_by_job: HashMap<JobId, Vec<TaskId>>,
}

impl MaterializedState {
    pub fn apply(&mut self, entry: &WalEntry) {
        match entry {
            WalEntry::JobAdded(job) | WalEntry::JobUpdated(job) => {
                self.jobs.insert(job.id, job.clone());
            }
            WalEntry::JobDeleted(id) => {
                self.jobs.remove(id);
                if let Some(task_ids) = self.tasks_by_job.remove(id) {
                    for tid in task_ids {
                        self.tasks.remove(&tid);
                    }
                }
            }
            WalEntry::TaskAdded(task) => {
                self.tasks_by_job.entry(task.job_id).or_default().push(task.id);
                self.tasks.insert(task.id, task.clone());
            }
            WalEntry::TaskUpdated(task) => {
                self.tasks.insert(task.id, task.clone());
            }
            WalEntry::WorkerUpserted(worker) => {
                self.workers.insert(worker.id, worker.clone());
            }
            WalEntry::WorkerDeleted(id) => {
                self.workers.remove(id);
            }
            WalEntry::JobStatusNote { .. } => {}
        }
    }

    pub fn get_job(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id)
    }

    /// Jobs matching `filter`, sorted by priority desc then submitted_at asc
    /// (spec §4.1 "Jobs by (priority desc, submitted asc)"), paginated.
    pub fn list_jobs(&self, filter: JobFilter, limit: usize, offset: usize) -> Vec<Job> {
        let mut jobs: Vec<&Job> = self
            .jobs
            .values()
            .filter(|j| match filter.status {
                Some(s) => j.status == s,
                None => true,
            })
            .collect();
        jobs.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.submitted_at.cmp(&b.submitted_at)));
        jobs.into_iter().skip(offset).take(limit).cloned().collect()
    }

    pub fn get_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Tasks of `job_id` in stable index order.
    pub fn list_tasks_by_job(&self, job_id: &JobId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks_by_job
            .get(job_id)
            .map(|ids| ids.iter().filter_map(|id| self.tasks.get(id).cloned()).collect())
            .unwrap_or_default();
        tasks.sort_by_key(|t| t.index);
        tasks
    }

    pub fn get_worker(&self, id: &WorkerId) -> Option<&Worker> {
        self.workers.get(id)
    }

    pub fn list_workers(&self) -> Vec<Worker> {
        self.workers.values().cloned().collect()
    }

    pub fn list_workers_by_status(&self, status: WorkerStatus) -> Vec<Worker> {
        self.workers.values().filter(|w| w.status == status).cloned().collect()
    }

    pub fn stats(&self) -> StatsSnapshot {
        let mut snapshot = StatsSnapshot::default();
        for job in self.jobs.values() {
            *snapshot.jobs_by_status.entry(job.status.to_string()).or_default() += 1;
        }
        for task in self.tasks.values() {
            *snapshot.tasks_by_status.entry(task.status.to_string()).or_default() += 1;
        }
        for worker in self.workers.values() {
            *snapshot.workers_by_status.entry(worker.status.to_string()).or_default() += 1;
        }
        snapshot
    }

    /// Whether every Task of `job_id` is in `status`.
    pub fn all_tasks_in_status(&self, job_id: &JobId, status: TaskStatus) -> bool {
        self.tasks_by_job
            .get(job_id)
            .map(|ids| ids.iter().all(|id| self.tasks.get(id).is_some_and(|t| t.status == status)))
            .unwrap_or(true)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
