// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use renderq_core::{JobId, JobStatus, Payload, TaskId, WorkerId};
use serde::{Deserialize, Serialize};

/// Every request a CLI or worker agent may send to the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Liveness check.
    Ping,

    /// Protocol version handshake, sent once per connection.
    Hello { version: String },

    // --- submission and job lifecycle (spec §4.7, §6) ---
    SubmitJob {
        name: String,
        plugin: String,
        #[serde(default)]
        priority: Option<i32>,
        #[serde(default)]
        pool: Option<String>,
        #[serde(default)]
        plugin_data: Payload,
        #[serde(default)]
        metadata: Payload,
        #[serde(default)]
        dependent_on: Vec<JobId>,
    },
    ListJobs {
        #[serde(default)]
        pool: Option<String>,
        #[serde(default)]
        status: Option<JobStatus>,
        #[serde(default)]
        plugin: Option<String>,
    },
    GetJob {
        id: JobId,
    },
    CancelJob {
        id: JobId,
    },
    SuspendJob {
        id: JobId,
    },
    ResumeJob {
        id: JobId,
    },
    RetryJob {
        id: JobId,
    },
    DeleteJob {
        id: JobId,
    },
    SetJobPriority {
        id: JobId,
        priority: i32,
    },

    // --- worker administration (spec §4.2, §6) ---
    ListWorkers,
    GetWorker {
        id: WorkerId,
    },
    DisableWorker {
        id: WorkerId,
    },
    EnableWorker {
        id: WorkerId,
    },
    DeleteWorker {
        id: WorkerId,
    },

    // --- introspection ---
    ListPlugins,
    GetStats,
    SubscribeEvents,

    // --- worker agent protocol (spec §4.8) ---
    RegisterWorker {
        hostname: String,
        mac_address: String,
        ip_address: String,
        #[serde(default)]
        pools: Vec<String>,
        #[serde(default)]
        capabilities: Vec<String>,
        cpu_cores: u32,
        memory_total_mb: u64,
        version: String,
    },
    Heartbeat {
        worker_id: WorkerId,
        cpu_usage_pct: f64,
        memory_used_mb: u64,
    },
    PullTask {
        worker_id: WorkerId,
    },
    StartTask {
        task_id: TaskId,
    },
    ReportProgress {
        task_id: TaskId,
        progress: f64,
    },
    CompleteTask {
        task_id: TaskId,
        exit_code: i32,
    },
    FailTask {
        task_id: TaskId,
        #[serde(default)]
        exit_code: Option<i32>,
        error_message: String,
    },
    /// Record the worker-local path a task's output log was written to
    /// (spec §4.8 "log upload" — the coordinator stores the path, not the
    /// bytes; clients fetch logs directly from the worker or shared store).
    UploadTaskLog {
        task_id: TaskId,
        log_path: String,
    },
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
