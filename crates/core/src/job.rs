// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job entity and its state machine (spec §3, §4.2).

use crate::error::CoreError;
use crate::payload::Payload;

crate::define_id! {
    /// Identifies a Job for its entire life.
    pub struct JobId("job-");
}

/// Job lifecycle status.
///
/// ```text
/// pending  -> queued        (plugin validated, tasks created)
/// pending  -> failed        (plugin validation or partitioning error)
/// queued   -> active        (first task assigned)
/// queued   -> suspended     (user)    suspended -> queued (user)
/// active   -> suspended     (user)    suspended -> active (user, iff no pending tasks)
/// active   -> completed     (all tasks completed)
/// active   -> failed        (any task failed after terminal aggregation)
/// any non-terminal -> cancelled   (user)
/// failed   -> queued        (retry: failed tasks reset to pending)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Queued,
    Active,
    Suspended,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Queued => "queued",
        Active => "active",
        Suspended => "suspended",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl JobStatus {
    /// Terminal statuses may only leave via an explicit retry (`Failed`).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition per the state machine.
    pub fn can_transition_to(self, next: Self) -> bool {
        use JobStatus::*;
        match (self, next) {
            (Pending, Queued | Failed) => true,
            (Queued, Active | Suspended | Cancelled) => true,
            (Active, Suspended | Completed | Failed | Cancelled) => true,
            (Suspended, Queued | Active | Cancelled) => true,
            (Failed, Queued) => true,
            // cancellation reachable from any non-terminal state
            (Pending, Cancelled) => true,
            _ => false,
        }
    }

    fn checked_transition(self, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::IllegalJobTransition { from: self, to: next })
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Aggregate task counts tracked on a Job (spec §3 "counts").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JobCounts {
    pub task_total: u32,
    pub task_completed: u32,
    pub task_failed: u32,
}

/// A unit of user-submitted rendering work; expands into one or more Tasks.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub plugin: String,
    pub priority: i32,
    pub pool: String,
    pub submitter: Option<String>,

    pub plugin_data: Payload,
    pub metadata: Payload,

    /// Job ids this job waits on before any of its Tasks become eligible.
    pub dependent_on: Vec<JobId>,

    pub status: JobStatus,
    pub progress: f64,
    pub counts: JobCounts,

    pub submitted_at: u64,
    pub started_at: Option<u64>,
    pub finished_at: Option<u64>,
    pub error_message: Option<String>,
}

/// Default pool name when a submission omits one.
pub const DEFAULT_POOL: &str = "default";

/// Default priority when a submission omits one.
pub const DEFAULT_PRIORITY: i32 = 50;

impl Job {
    /// Construct a new Job in `pending` status, as produced by a fresh
    /// submission before plugin validation and partitioning (spec §4.7).
    pub fn new(
        name: impl Into<String>,
        plugin: impl Into<String>,
        priority: i32,
        pool: impl Into<String>,
        plugin_data: Payload,
        dependent_on: Vec<JobId>,
        metadata: Payload,
        submitted_at: u64,
    ) -> Result<Self, CoreError> {
        validate_priority(priority)?;
        Ok(Self {
            id: JobId::new(),
            name: name.into(),
            plugin: plugin.into(),
            priority,
            pool: pool.into(),
            submitter: None,
            plugin_data,
            metadata,
            dependent_on,
            status: JobStatus::Pending,
            progress: 0.0,
            counts: JobCounts::default(),
            submitted_at,
            started_at: None,
            finished_at: None,
            error_message: None,
        })
    }

    /// Apply a status transition, checking legality. `now` stamps
    /// `started_at`/`finished_at` as appropriate.
    pub fn transition_to(&mut self, next: JobStatus, now: u64) -> Result<(), CoreError> {
        let next = self.status.checked_transition(next)?;
        if next == JobStatus::Active && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if matches!(next, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled) {
            self.finished_at = Some(now);
        }
        // A retry (Failed -> Queued) resets aggregate progress; see
        // `JobStatus::can_transition_to` and the retry idempotence law.
        if self.status == JobStatus::Failed && next == JobStatus::Queued {
            self.progress = 0.0;
            self.error_message = None;
            self.finished_at = None;
        }
        self.status = next;
        Ok(())
    }

    pub fn set_priority(&mut self, priority: i32) -> Result<(), CoreError> {
        validate_priority(priority)?;
        self.priority = priority;
        Ok(())
    }

    pub fn is_eligible_dependencies_met(&self, completed: impl Fn(&JobId) -> bool) -> bool {
        self.dependent_on.iter().all(|id| completed(id))
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }
}

fn validate_priority(priority: i32) -> Result<(), CoreError> {
    if (0..=100).contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::PriorityOutOfRange(priority))
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct JobBuilder {
    name: String,
    plugin: String,
    priority: i32,
    pool: String,
    plugin_data: Payload,
    metadata: Payload,
    dependent_on: Vec<JobId>,
    submitted_at: u64,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for JobBuilder {
    fn default() -> Self {
        Self {
            name: "test-job".into(),
            plugin: "aftereffects".into(),
            priority: DEFAULT_PRIORITY,
            pool: DEFAULT_POOL.into(),
            plugin_data: Payload::new(),
            metadata: Payload::new(),
            dependent_on: Vec::new(),
            submitted_at: 0,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobBuilder {
    crate::setters! {
        into { name: String, plugin: String, pool: String }
        set { priority: i32, submitted_at: u64, plugin_data: Payload, metadata: Payload, dependent_on: Vec<JobId> }
    }

    pub fn build(self) -> Job {
        Job {
            id: JobId::new(),
            name: self.name,
            plugin: self.plugin,
            priority: self.priority,
            pool: self.pool,
            submitter: None,
            plugin_data: self.plugin_data,
            metadata: self.metadata,
            dependent_on: self.dependent_on,
            status: JobStatus::Pending,
            progress: 0.0,
            counts: JobCounts::default(),
            submitted_at: self.submitted_at,
            started_at: None,
            finished_at: None,
            error_message: None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
