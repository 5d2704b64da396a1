// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by illegal state-machine transitions.

use crate::job::JobStatus;
use crate::task::TaskStatus;
use crate::worker::WorkerStatus;
use thiserror::Error;

/// Errors raised attempting an illegal transition on a core entity.
///
/// These are the `illegal_transition` cases of the error taxonomy; callers
/// at the coordinator boundary convert them to a user-visible response.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CoreError {
    #[error("job cannot transition from {from} to {to}")]
    IllegalJobTransition { from: JobStatus, to: JobStatus },

    #[error("task cannot transition from {from} to {to}")]
    IllegalTaskTransition { from: TaskStatus, to: TaskStatus },

    #[error("worker cannot transition from {from} to {to}")]
    IllegalWorkerTransition { from: WorkerStatus, to: WorkerStatus },

    #[error("priority {0} out of range 0..=100")]
    PriorityOutOfRange(i32),

    #[error("task frame range invalid: start {start} > end {end}")]
    InvalidFrameRange { start: u32, end: u32 },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
