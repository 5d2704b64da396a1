// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-model DTOs exchanged over the wire. These are deliberately distinct
//! from the domain entities in `renderq-core`: the wire shape is what a
//! client should see, not the full internal record.

use renderq_core::{Job, JobCounts, JobId, JobStatus, Payload, Task, TaskId, TaskStatus, Worker, WorkerId, WorkerStatus};
use serde::{Deserialize, Serialize};

/// One row of a job listing (spec §6 "list jobs").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSummary {
    pub id: JobId,
    pub name: String,
    pub plugin: String,
    pub pool: String,
    pub priority: i32,
    pub status: JobStatus,
    pub progress: f64,
    pub counts: JobCounts,
    pub submitted_at: u64,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            name: job.name.clone(),
            plugin: job.plugin.clone(),
            pool: job.pool.clone(),
            priority: job.priority,
            status: job.status,
            progress: job.progress,
            counts: job.counts,
            submitted_at: job.submitted_at,
        }
    }
}

/// Full detail for a single job, including its tasks (spec §6 "get job").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobDetail {
    pub id: JobId,
    pub name: String,
    pub plugin: String,
    pub pool: String,
    pub priority: i32,
    pub status: JobStatus,
    pub progress: f64,
    pub counts: JobCounts,
    pub plugin_data: Payload,
    pub metadata: Payload,
    pub dependent_on: Vec<JobId>,
    pub submitted_at: u64,
    pub started_at: Option<u64>,
    pub finished_at: Option<u64>,
    pub error_message: Option<String>,
    pub tasks: Vec<TaskDetail>,
}

impl JobDetail {
    pub fn new(job: &Job, tasks: Vec<TaskDetail>) -> Self {
        Self {
            id: job.id,
            name: job.name.clone(),
            plugin: job.plugin.clone(),
            pool: job.pool.clone(),
            priority: job.priority,
            status: job.status,
            progress: job.progress,
            counts: job.counts,
            plugin_data: job.plugin_data.clone(),
            metadata: job.metadata.clone(),
            dependent_on: job.dependent_on.clone(),
            submitted_at: job.submitted_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
            error_message: job.error_message.clone(),
            tasks,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDetail {
    pub id: TaskId,
    pub job_id: JobId,
    pub index: u32,
    pub frame_start: Option<u32>,
    pub frame_end: Option<u32>,
    pub status: TaskStatus,
    pub progress: f64,
    pub assigned_worker: Option<WorkerId>,
    pub started_at: Option<u64>,
    pub finished_at: Option<u64>,
    pub exit_code: Option<i32>,
    pub error_message: Option<String>,
}

impl From<&Task> for TaskDetail {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            job_id: task.job_id,
            index: task.index,
            frame_start: task.frame_start,
            frame_end: task.frame_end,
            status: task.status,
            progress: task.progress,
            assigned_worker: task.assigned_worker,
            started_at: task.started_at,
            finished_at: task.finished_at,
            exit_code: task.exit_code,
            error_message: task.error_message.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerSummary {
    pub id: WorkerId,
    pub name: String,
    pub hostname: String,
    pub ip_address: String,
    pub version: String,
    pub pools: Vec<String>,
    pub capabilities: Vec<String>,
    pub status: WorkerStatus,
    pub current_task: Option<TaskId>,
    pub cpu_cores: u32,
    pub cpu_usage_pct: f64,
    pub memory_total_mb: u64,
    pub memory_used_mb: u64,
    pub last_heartbeat: u64,
}

impl From<&Worker> for WorkerSummary {
    fn from(worker: &Worker) -> Self {
        Self {
            id: worker.id,
            name: worker.name.clone(),
            hostname: worker.hostname.clone(),
            ip_address: worker.ip_address.clone(),
            version: worker.version.clone(),
            pools: worker.pools.clone(),
            capabilities: worker.capabilities.clone(),
            status: worker.status,
            current_task: worker.current_task,
            cpu_cores: worker.cpu_cores,
            cpu_usage_pct: worker.cpu_usage_pct,
            memory_total_mb: worker.memory_total_mb,
            memory_used_mb: worker.memory_used_mb,
            last_heartbeat: worker.last_heartbeat,
        }
    }
}

/// Mirrors `renderq_plugins::ParameterKind` without creating a dependency
/// from this crate on the plugins crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKindWire {
    String,
    Int,
    Float,
    Bool,
    Path,
    Choice,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterSpecWire {
    #[serde(rename = "type")]
    pub kind: ParameterKindWire,
    pub label: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginSummary {
    pub name: String,
    pub display_name: String,
    pub version: String,
    pub description: String,
    pub parameters: indexmap::IndexMap<String, ParameterSpecWire>,
}

/// Coordinator-wide aggregate counters (spec §6 "stats").
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsSnapshot {
    pub jobs_pending: u64,
    pub jobs_queued: u64,
    pub jobs_active: u64,
    pub jobs_suspended: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub jobs_cancelled: u64,
    pub tasks_pending: u64,
    pub tasks_assigned: u64,
    pub tasks_running: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub workers_idle: u64,
    pub workers_busy: u64,
    pub workers_offline: u64,
    pub workers_disabled: u64,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
