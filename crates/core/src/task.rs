// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Task entity and its state machine (spec §3, §4.2).

use crate::error::CoreError;
use crate::job::JobId;
use crate::payload::Payload;
use crate::worker::WorkerId;

crate::define_id! {
    /// Identifies a Task for its entire life.
    pub struct TaskId("tsk-");
}

/// Task lifecycle status.
///
/// ```text
/// pending  -> assigned      (dispatcher)
/// assigned -> running       (worker reports start)
/// running  -> completed     (worker reports exit 0)
/// running  -> failed        (worker reports non-zero, worker timeout, or cancel)
/// failed   -> pending       (retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Assigned,
    Running,
    Completed,
    Failed,
}

crate::simple_display! {
    TaskStatus {
        Pending => "pending",
        Assigned => "assigned",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// A Task is held by a Worker while in either of these states (spec §3
    /// invariant: "a Task in status `assigned` or `running` has non-null
    /// `assigned_worker`").
    pub fn is_held(self) -> bool {
        matches!(self, Self::Assigned | Self::Running)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Assigned) | (Assigned, Running) | (Running, Completed) | (Running, Failed) | (Failed, Pending)
            // Cancellation/suspension fold a running or assigned task to
            // failed or back to pending; admin paths route through these
            // same two edges rather than adding new ones.
            | (Assigned, Pending)
            | (Running, Pending)
        )
    }

    fn checked_transition(self, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::IllegalTaskTransition { from: self, to: next })
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A single externally-executed unit of work belonging to one Job.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub job_id: JobId,
    /// Stable ordering within the Job (spec §3 "link: job id + integer index").
    pub index: u32,

    pub frame_start: Option<u32>,
    pub frame_end: Option<u32>,
    pub plugin_data: Payload,

    pub command: Vec<String>,
    pub working_dir: Option<String>,
    pub env: Payload,
    pub log_path: Option<String>,

    pub status: TaskStatus,
    pub progress: f64,
    pub assigned_worker: Option<WorkerId>,
    pub started_at: Option<u64>,
    pub finished_at: Option<u64>,
    pub exit_code: Option<i32>,
    pub error_message: Option<String>,
}

impl Task {
    /// Construct a Task as produced by a plugin's `create_tasks` partitioner.
    /// The command vector is typically empty until `build_command` runs on
    /// the assigned worker.
    pub fn new(
        job_id: JobId,
        index: u32,
        frame_start: Option<u32>,
        frame_end: Option<u32>,
        plugin_data: Payload,
    ) -> Result<Self, CoreError> {
        if let (Some(start), Some(end)) = (frame_start, frame_end) {
            if start > end {
                return Err(CoreError::InvalidFrameRange { start, end });
            }
        }
        Ok(Self {
            id: TaskId::new(),
            job_id,
            index,
            frame_start,
            frame_end,
            plugin_data,
            command: Vec::new(),
            working_dir: None,
            env: Payload::new(),
            log_path: None,
            status: TaskStatus::Pending,
            progress: 0.0,
            assigned_worker: None,
            started_at: None,
            finished_at: None,
            exit_code: None,
            error_message: None,
        })
    }

    /// Atomically assign this pending Task to `worker` (spec §4.3 step 5).
    pub fn assign(&mut self, worker: WorkerId) -> Result<(), CoreError> {
        self.status = self.status.checked_transition(TaskStatus::Assigned)?;
        self.assigned_worker = Some(worker);
        Ok(())
    }

    pub fn start(&mut self, now: u64) -> Result<(), CoreError> {
        self.status = self.status.checked_transition(TaskStatus::Running)?;
        self.started_at = Some(now);
        Ok(())
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 100.0);
    }

    pub fn complete(&mut self, exit_code: i32, now: u64) -> Result<(), CoreError> {
        self.status = self.status.checked_transition(TaskStatus::Completed)?;
        self.exit_code = Some(exit_code);
        self.finished_at = Some(now);
        self.progress = 100.0;
        Ok(())
    }

    pub fn fail(&mut self, exit_code: Option<i32>, error_message: impl Into<String>, now: u64) -> Result<(), CoreError> {
        self.status = self.status.checked_transition(TaskStatus::Failed)?;
        self.exit_code = exit_code;
        self.error_message = Some(error_message.into());
        self.finished_at = Some(now);
        Ok(())
    }

    /// Reset a held Task back to `pending` (worker timeout, or retry from
    /// `failed`), clearing assignment and terminal bookkeeping.
    pub fn reset_to_pending(&mut self) -> Result<(), CoreError> {
        self.status = self.status.checked_transition(TaskStatus::Pending)?;
        self.assigned_worker = None;
        self.started_at = None;
        self.finished_at = None;
        self.exit_code = None;
        self.error_message = None;
        self.progress = 0.0;
        Ok(())
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn builder(job_id: JobId) -> TaskBuilder {
        TaskBuilder::new(job_id)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct TaskBuilder {
    job_id: JobId,
    index: u32,
    frame_start: Option<u32>,
    frame_end: Option<u32>,
    plugin_data: Payload,
}

#[cfg(any(test, feature = "test-support"))]
impl TaskBuilder {
    fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            index: 0,
            frame_start: None,
            frame_end: None,
            plugin_data: Payload::new(),
        }
    }

    crate::setters! {
        set { index: u32, plugin_data: Payload }
        option { frame_start: u32, frame_end: u32 }
    }

    pub fn build(self) -> Task {
        Task {
            id: TaskId::new(),
            job_id: self.job_id,
            index: self.index,
            frame_start: self.frame_start,
            frame_end: self.frame_end,
            plugin_data: self.plugin_data,
            command: Vec::new(),
            working_dir: None,
            env: Payload::new(),
            log_path: None,
            status: TaskStatus::Pending,
            progress: 0.0,
            assigned_worker: None,
            started_at: None,
            finished_at: None,
            exit_code: None,
            error_message: None,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
