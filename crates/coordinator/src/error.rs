// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator-level error taxonomy (spec §7). Variants map 1:1 onto the
//! user-visible error kinds; `worker_timeout`/`child_process_failure` never
//! reach here because they are pure store-state transitions, logged but
//! never returned to a caller.

use renderq_core::{CoreError, JobId, TaskId, WorkerId};
use renderq_store::StoreError;
use renderq_wire::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("partitioning failed: {0}")]
    PartitionFailed(String),

    #[error("job not found: {0}")]
    JobNotFound(JobId),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("worker not found: {0}")]
    WorkerNotFound(WorkerId),

    #[error("illegal transition: {0}")]
    IllegalTransition(#[from] CoreError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoordinatorError {
    /// Map to the wire-level taxonomy (spec §7). `Store`'s not-found variants
    /// are folded into this crate's own `*NotFound` variants before they ever
    /// reach here — see `submission.rs`/`worker_protocol.rs`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownPlugin(_) => ErrorKind::UnknownPlugin,
            Self::ValidationFailed(_) => ErrorKind::ValidationFailed,
            Self::PartitionFailed(_) => ErrorKind::PartitionFailed,
            Self::JobNotFound(_) | Self::TaskNotFound(_) | Self::WorkerNotFound(_) => ErrorKind::NotFound,
            Self::IllegalTransition(_) => ErrorKind::IllegalTransition,
            Self::Store(inner) => match inner {
                StoreError::JobNotFound(_) | StoreError::TaskNotFound(_) | StoreError::WorkerNotFound(_) => ErrorKind::NotFound,
                StoreError::IllegalTransition(_) => ErrorKind::IllegalTransition,
                _ => ErrorKind::StoreError,
            },
            Self::Config(_) | Self::Io(_) => ErrorKind::StoreError,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
