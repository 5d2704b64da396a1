// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the store boundary (spec §7: `not_found`,
//! `illegal_transition`, `store_error`).

use renderq_core::{CoreError, JobId, TaskId, WorkerId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("worker not found: {0}")]
    WorkerNotFound(WorkerId),

    #[error("illegal transition: {0}")]
    IllegalTransition(#[from] CoreError),

    #[error("worker {0} must be offline or disabled before deletion")]
    WorkerNotDeletable(WorkerId),

    #[error("job {0} must be in a terminal state before deletion")]
    JobNotDeletable(JobId),

    #[error("wal io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("wal serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
