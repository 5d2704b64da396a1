// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed event set emitted by the coordinator (spec §4.9).
//!
//! Serializes as `{"type": "job.submitted", ...fields, "timestamp": ...}`.
//! There is no `Custom` fallback variant: every event the coordinator can
//! ever emit is named here, closing the set the way the plugin contract
//! closes its own hook set (spec §9 "no hidden global state" / "closed
//! interface" principles applied to events too).

use crate::job::JobId;
use crate::task::TaskId;
use crate::worker::WorkerId;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    #[serde(rename = "job.submitted")]
    JobSubmitted { job_id: JobId, timestamp: u64 },
    #[serde(rename = "job.started")]
    JobStarted { job_id: JobId, timestamp: u64 },
    #[serde(rename = "job.progress")]
    JobProgress { job_id: JobId, progress: f64, timestamp: u64 },
    #[serde(rename = "job.completed")]
    JobCompleted { job_id: JobId, timestamp: u64 },
    #[serde(rename = "job.failed")]
    JobFailed { job_id: JobId, error_message: String, timestamp: u64 },
    #[serde(rename = "job.cancelled")]
    JobCancelled { job_id: JobId, timestamp: u64 },
    #[serde(rename = "job.suspended")]
    JobSuspended { job_id: JobId, timestamp: u64 },
    #[serde(rename = "job.resumed")]
    JobResumed { job_id: JobId, timestamp: u64 },

    #[serde(rename = "task.assigned")]
    TaskAssigned { task_id: TaskId, job_id: JobId, worker_id: WorkerId, timestamp: u64 },
    #[serde(rename = "task.started")]
    TaskStarted { task_id: TaskId, job_id: JobId, timestamp: u64 },
    #[serde(rename = "task.progress")]
    TaskProgress { task_id: TaskId, job_id: JobId, progress: f64, timestamp: u64 },
    #[serde(rename = "task.completed")]
    TaskCompleted { task_id: TaskId, job_id: JobId, timestamp: u64 },
    #[serde(rename = "task.failed")]
    TaskFailed { task_id: TaskId, job_id: JobId, error_message: String, timestamp: u64 },

    #[serde(rename = "worker.connected")]
    WorkerConnected { worker_id: WorkerId, timestamp: u64 },
    #[serde(rename = "worker.disconnected")]
    WorkerDisconnected { worker_id: WorkerId, timestamp: u64 },
    #[serde(rename = "worker.heartbeat")]
    WorkerHeartbeat { worker_id: WorkerId, timestamp: u64 },
}

impl Event {
    /// The dotted type string this event serializes its `type` tag as,
    /// e.g. `"job.completed"`. Useful for subscribers that filter by type
    /// string rather than matching the enum (spec §4.9 "Subscribers
    /// register by type or globally").
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::JobSubmitted { .. } => "job.submitted",
            Self::JobStarted { .. } => "job.started",
            Self::JobProgress { .. } => "job.progress",
            Self::JobCompleted { .. } => "job.completed",
            Self::JobFailed { .. } => "job.failed",
            Self::JobCancelled { .. } => "job.cancelled",
            Self::JobSuspended { .. } => "job.suspended",
            Self::JobResumed { .. } => "job.resumed",
            Self::TaskAssigned { .. } => "task.assigned",
            Self::TaskStarted { .. } => "task.started",
            Self::TaskProgress { .. } => "task.progress",
            Self::TaskCompleted { .. } => "task.completed",
            Self::TaskFailed { .. } => "task.failed",
            Self::WorkerConnected { .. } => "worker.connected",
            Self::WorkerDisconnected { .. } => "worker.disconnected",
            Self::WorkerHeartbeat { .. } => "worker.heartbeat",
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            Self::JobSubmitted { timestamp, .. }
            | Self::JobStarted { timestamp, .. }
            | Self::JobProgress { timestamp, .. }
            | Self::JobCompleted { timestamp, .. }
            | Self::JobFailed { timestamp, .. }
            | Self::JobCancelled { timestamp, .. }
            | Self::JobSuspended { timestamp, .. }
            | Self::JobResumed { timestamp, .. }
            | Self::TaskAssigned { timestamp, .. }
            | Self::TaskStarted { timestamp, .. }
            | Self::TaskProgress { timestamp, .. }
            | Self::TaskCompleted { timestamp, .. }
            | Self::TaskFailed { timestamp, .. }
            | Self::WorkerConnected { timestamp, .. }
            | Self::WorkerDisconnected { timestamp, .. }
            | Self::WorkerHeartbeat { timestamp, .. } => *timestamp,
        }
    }

    /// The Job this event concerns, if any (most Task events also carry a
    /// job id — this follows the Job, since the Broadcaster and UI group
    /// by job first).
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Self::JobSubmitted { job_id, .. }
            | Self::JobStarted { job_id, .. }
            | Self::JobProgress { job_id, .. }
            | Self::JobCompleted { job_id, .. }
            | Self::JobFailed { job_id, .. }
            | Self::JobCancelled { job_id, .. }
            | Self::JobSuspended { job_id, .. }
            | Self::JobResumed { job_id, .. }
            | Self::TaskAssigned { job_id, .. }
            | Self::TaskStarted { job_id, .. }
            | Self::TaskProgress { job_id, .. }
            | Self::TaskCompleted { job_id, .. }
            | Self::TaskFailed { job_id, .. } => Some(job_id),
            Self::WorkerConnected { .. } | Self::WorkerDisconnected { .. } | Self::WorkerHeartbeat { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
