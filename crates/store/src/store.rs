// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable [`Store`]: every mutation is a single critical section that
//! appends to the WAL and applies to materialized state before returning,
//! so concurrent readers never observe a torn write (spec §4.1, §5).

use parking_lot::Mutex;
use renderq_core::{Job, JobId, JobStatus, Task, TaskId, TaskStatus, Worker, WorkerId, WorkerStatus};
use std::path::Path;

use crate::dispatch::select_candidate;
use crate::error::{Result, StoreError};
use crate::snapshot::Snapshot;
use crate::state::{JobFilter, MaterializedState, StatsSnapshot, WorkerTelemetry};
use crate::wal::{Wal, WalEntry};

struct Inner {
    state: MaterializedState,
    wal: Wal,
}

/// Durable, transactionally consistent store for Jobs, Tasks and Workers
/// (spec §4.1). Cloning a `Store` shares the same underlying state — it is
/// an `Arc`-like handle, safe to pass to every coordinator subsystem.
#[derive(Clone)]
pub struct Store {
    inner: std::sync::Arc<Mutex<Inner>>,
}

impl Store {
    pub fn in_memory() -> Self {
        Self { inner: std::sync::Arc::new(Mutex::new(Inner { state: MaterializedState::default(), wal: Wal::in_memory() })) }
    }

    /// Open a durable store rooted at `wal_path`, replaying any existing log
    /// to rebuild materialized state.
    pub fn open(wal_path: impl AsRef<Path>) -> Result<Self> {
        let mut state = MaterializedState::default();
        Wal::replay(&wal_path, |entry| state.apply(&entry))?;
        let wal = Wal::open(&wal_path)?;
        Ok(Self { inner: std::sync::Arc::new(Mutex::new(Inner { state, wal })) })
    }

    /// Open a durable store, seeding materialized state from `snapshot_path`
    /// (if present) before replaying `wal_path` on top — the full startup
    /// recovery path (spec §4.1, §5 "restart recovery").
    pub fn open_with_snapshot(snapshot_path: impl AsRef<Path>, wal_path: impl AsRef<Path>) -> Result<Self> {
        let mut state = Snapshot::load(&snapshot_path)?.map(|s| s.state).unwrap_or_default();
        Wal::replay(&wal_path, |entry| state.apply(&entry))?;
        let wal = Wal::open(&wal_path)?;
        Ok(Self { inner: std::sync::Arc::new(Mutex::new(Inner { state, wal })) })
    }

    /// Write the current materialized state to `snapshot_path` and truncate
    /// the WAL, bounding replay time on the next restart (spec §4.1
    /// "periodic snapshot compacts the WAL").
    pub fn compact(&self, snapshot_path: impl AsRef<Path>) -> Result<()> {
        let mut inner = self.inner.lock();
        Snapshot::new(inner.state.clone()).save(&snapshot_path)?;
        inner.wal.truncate()?;
        Ok(())
    }

    fn mutate<T>(&self, entry: WalEntry, f: impl FnOnce(&mut MaterializedState) -> T) -> Result<T> {
        let mut inner = self.inner.lock();
        inner.wal.append(&entry)?;
        inner.state.apply(&entry);
        Ok(f(&mut inner.state))
    }

    // ---- Jobs ----------------------------------------------------------

    pub fn add_job(&self, job: Job) -> Result<()> {
        self.mutate(WalEntry::JobAdded(job), |_| ())
    }

    pub fn get_job(&self, id: &JobId) -> Option<Job> {
        self.inner.lock().state.get_job(id).cloned()
    }

    pub fn list_jobs(&self, filter: JobFilter, limit: usize, offset: usize) -> Vec<Job> {
        self.inner.lock().state.list_jobs(filter, limit, offset)
    }

    pub fn update_job(&self, job: Job) -> Result<()> {
        self.mutate(WalEntry::JobUpdated(job), |_| ())
    }

    /// Delete a Job and cascade its Tasks. Only legal once the Job is
    /// terminal (spec §3 "deleted only when status ∈ {completed, cancelled,
    /// failed}").
    pub fn delete_job(&self, id: &JobId) -> Result<()> {
        let terminal = {
            let inner = self.inner.lock();
            match inner.state.get_job(id) {
                Some(job) => job.status.is_terminal(),
                None => return Err(StoreError::JobNotFound(*id)),
            }
        };
        if !terminal {
            return Err(StoreError::JobNotDeletable(*id));
        }
        self.mutate(WalEntry::JobDeleted(*id), |_| ())
    }

    fn with_job<T>(&self, id: &JobId, f: impl FnOnce(&mut Job) -> Result<T>) -> Result<(Job, T)> {
        let mut job = self.get_job(id).ok_or(StoreError::JobNotFound(*id))?;
        let ret = f(&mut job)?;
        self.update_job(job.clone())?;
        Ok((job, ret))
    }

    pub fn set_job_priority(&self, id: &JobId, priority: i32) -> Result<Job> {
        self.with_job(id, |job| job.set_priority(priority).map_err(StoreError::from)).map(|(job, ())| job)
    }

    pub fn suspend_job(&self, id: &JobId, now: u64) -> Result<Job> {
        self.with_job(id, |job| job.transition_to(JobStatus::Suspended, now).map_err(StoreError::from))
            .map(|(job, ())| job)
    }

    /// Resume always routes through `queued`, letting the next successful
    /// pull promote the Job to `active` (spec §9 open question resolution).
    pub fn resume_job(&self, id: &JobId, now: u64) -> Result<Job> {
        self.with_job(id, |job| job.transition_to(JobStatus::Queued, now).map_err(StoreError::from))
            .map(|(job, ())| job)
    }

    pub fn cancel_job(&self, id: &JobId, now: u64) -> Result<Job> {
        self.with_job(id, |job| job.transition_to(JobStatus::Cancelled, now).map_err(StoreError::from))
            .map(|(job, ())| job)
    }

    /// Reset all of a failed Job's failed Tasks to `pending` and return the
    /// Job to `queued` (spec §4.2 "failed -> queued (retry)").
    pub fn retry_job(&self, id: &JobId, now: u64) -> Result<Job> {
        let task_ids: Vec<TaskId> = {
            let inner = self.inner.lock();
            inner
                .state
                .list_tasks_by_job(id)
                .into_iter()
                .filter(|t| t.status == TaskStatus::Failed)
                .map(|t| t.id)
                .collect()
        };
        for task_id in task_ids {
            self.retry_task(&task_id)?;
        }
        self.with_job(id, |job| job.transition_to(JobStatus::Queued, now).map_err(StoreError::from))
            .map(|(job, ())| job)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.lock().state.stats()
    }

    // ---- Tasks -----------------------------------------------------------

    pub fn add_task(&self, task: Task) -> Result<()> {
        self.mutate(WalEntry::TaskAdded(task), |_| ())
    }

    pub fn add_tasks(&self, tasks: Vec<Task>) -> Result<()> {
        for task in tasks {
            self.add_task(task)?;
        }
        Ok(())
    }

    pub fn get_task(&self, id: &TaskId) -> Option<Task> {
        self.inner.lock().state.get_task(id).cloned()
    }

    pub fn list_tasks_by_job(&self, job_id: &JobId) -> Vec<Task> {
        self.inner.lock().state.list_tasks_by_job(job_id)
    }

    pub fn update_task(&self, task: Task) -> Result<()> {
        self.mutate(WalEntry::TaskUpdated(task), |_| ())
    }

    fn with_task<T>(&self, id: &TaskId, f: impl FnOnce(&mut Task) -> Result<T>) -> Result<(Task, T)> {
        let mut task = self.get_task(id).ok_or(StoreError::TaskNotFound(*id))?;
        let ret = f(&mut task)?;
        self.update_task(task.clone())?;
        Ok((task, ret))
    }

    pub fn set_task_progress(&self, id: &TaskId, progress: f64) -> Result<Task> {
        self.with_task(id, |task| {
            task.set_progress(progress);
            Ok(())
        })
        .map(|(task, ())| task)
    }

    pub fn start_task(&self, id: &TaskId, now: u64) -> Result<Task> {
        self.with_task(id, |task| task.start(now).map_err(StoreError::from)).map(|(task, ())| task)
    }

    /// Complete a Task and release its Worker in one transaction (spec §4.8
    /// "On complete/fail, release the assigned Worker").
    pub fn complete_task(&self, id: &TaskId, exit_code: i32, now: u64) -> Result<Task> {
        let (task, ()) = self.with_task(id, |task| task.complete(exit_code, now).map_err(StoreError::from))?;
        self.release_worker_for(&task)?;
        Ok(task)
    }

    pub fn fail_task(&self, id: &TaskId, exit_code: Option<i32>, error_message: impl Into<String>, now: u64) -> Result<Task> {
        let message = error_message.into();
        let (task, ()) =
            self.with_task(id, |task| task.fail(exit_code, message, now).map_err(StoreError::from))?;
        self.release_worker_for(&task)?;
        Ok(task)
    }

    /// Reset a failed Task back to `pending` (spec §4.2 "failed -> pending
    /// (retry)").
    pub fn retry_task(&self, id: &TaskId) -> Result<Task> {
        self.with_task(id, |task| task.reset_to_pending().map_err(StoreError::from)).map(|(task, ())| task)
    }

    /// Release an in-flight (assigned/running) Task back to `pending`
    /// without a Worker — used by suspend and by heartbeat-timeout recovery
    /// (spec §4.4a, §5 "Suspend on an active Job").
    pub fn release_task_to_pending(&self, id: &TaskId) -> Result<Task> {
        let (task, ()) = self.with_task(id, |task| task.reset_to_pending().map_err(StoreError::from))?;
        self.release_worker_for(&task)?;
        Ok(task)
    }

    fn release_worker_for(&self, task: &Task) -> Result<()> {
        let Some(worker_id) = task.assigned_worker else { return Ok(()) };
        if let Some(worker) = self.get_worker(&worker_id) {
            if worker.current_task == Some(task.id) {
                self.release_worker(&worker_id)?;
            }
        }
        Ok(())
    }

    // ---- Workers -----------------------------------------------------------

    pub fn upsert_worker(&self, worker: Worker) -> Result<()> {
        self.mutate(WalEntry::WorkerUpserted(worker), |_| ())
    }

    pub fn get_worker(&self, id: &WorkerId) -> Option<Worker> {
        self.inner.lock().state.get_worker(id).cloned()
    }

    pub fn list_workers(&self) -> Vec<Worker> {
        self.inner.lock().state.list_workers()
    }

    pub fn list_workers_by_status(&self, status: WorkerStatus) -> Vec<Worker> {
        self.inner.lock().state.list_workers_by_status(status)
    }

    fn with_worker<T>(&self, id: &WorkerId, f: impl FnOnce(&mut Worker) -> Result<T>) -> Result<(Worker, T)> {
        let mut worker = self.get_worker(id).ok_or(StoreError::WorkerNotFound(*id))?;
        let ret = f(&mut worker)?;
        self.upsert_worker(worker.clone())?;
        Ok((worker, ret))
    }

    pub fn update_worker_heartbeat(&self, id: &WorkerId, telemetry: WorkerTelemetry, now: u64) -> Result<Worker> {
        self.with_worker(id, |worker| {
            worker.heartbeat(telemetry.cpu_usage_pct, telemetry.memory_used_mb, now);
            Ok(())
        })
        .map(|(worker, ())| worker)
    }

    fn release_worker(&self, id: &WorkerId) -> Result<Worker> {
        self.with_worker(id, |worker| worker.release().map_err(StoreError::from)).map(|(worker, ())| worker)
    }

    /// Mark a Worker offline, releasing a `running` Task it held back to
    /// `pending` so it is eligible for re-dispatch (spec §4.4a). Returns the
    /// released Task id, if any.
    pub fn mark_worker_offline(&self, id: &WorkerId) -> Result<Option<TaskId>> {
        let (worker, ()) = self.with_worker(id, |worker| worker.mark_offline().map_err(StoreError::from))?;
        let Some(task_id) = worker.current_task else { return Ok(None) };
        let Some(task) = self.get_task(&task_id) else { return Ok(None) };
        if task.status == TaskStatus::Running || task.status == TaskStatus::Assigned {
            self.with_task(&task_id, |task| task.reset_to_pending().map_err(StoreError::from))?;
            Ok(Some(task_id))
        } else {
            Ok(None)
        }
    }

    pub fn enable_worker(&self, id: &WorkerId) -> Result<Worker> {
        self.with_worker(id, |worker| worker.enable().map_err(StoreError::from)).map(|(worker, ())| worker)
    }

    pub fn disable_worker(&self, id: &WorkerId) -> Result<Worker> {
        self.with_worker(id, |worker| worker.disable().map_err(StoreError::from)).map(|(worker, ())| worker)
    }

    pub fn delete_worker(&self, id: &WorkerId) -> Result<()> {
        let deletable = self.get_worker(id).ok_or(StoreError::WorkerNotFound(*id))?.deletable();
        if !deletable {
            return Err(StoreError::WorkerNotDeletable(*id));
        }
        self.mutate(WalEntry::WorkerDeleted(*id), |_| ())
    }

    // ---- Dispatch ----------------------------------------------------------

    /// The dispatch primitive (spec §4.3): atomically select and assign at
    /// most one Task to `worker_id`. Holds the store lock for the entire
    /// selection + assignment so two concurrent callers can never win the
    /// same Task.
    pub fn next_task_for_worker(&self, worker_id: &WorkerId, now: u64) -> Result<Option<Task>> {
        let mut inner = self.inner.lock();

        let Some(worker) = inner.state.get_worker(worker_id).cloned() else {
            return Err(StoreError::WorkerNotFound(*worker_id));
        };
        if worker.status != WorkerStatus::Idle {
            return Ok(None);
        }
        let Some(task_id) = select_candidate(&inner.state, &worker) else { return Ok(None) };

        // All four mutations below (task, worker, and possibly job) are
        // applied while still holding `inner`'s lock, keeping the
        // transaction atomic end to end.
        let mut task = match inner.state.get_task(&task_id) {
            Some(t) => t.clone(),
            None => return Ok(None),
        };
        task.assign(worker_id.to_owned()).map_err(StoreError::from)?;
        let task_entry = WalEntry::TaskUpdated(task.clone());
        inner.wal.append(&task_entry)?;
        inner.state.apply(&task_entry);

        let mut worker = worker;
        worker.assign(task_id).map_err(StoreError::from)?;
        let worker_entry = WalEntry::WorkerUpserted(worker);
        inner.wal.append(&worker_entry)?;
        inner.state.apply(&worker_entry);

        if let Some(mut job) = inner.state.get_job(&task.job_id).cloned() {
            if job.status == JobStatus::Queued {
                job.transition_to(JobStatus::Active, now).map_err(StoreError::from)?;
                let job_entry = WalEntry::JobUpdated(job);
                inner.wal.append(&job_entry)?;
                inner.state.apply(&job_entry);
            }
        }

        Ok(Some(task))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
