// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log: one JSON object per line, fsync'd before the call that
//! appended it returns. Replaying the log from the last snapshot
//! reconstructs [`crate::MaterializedState`] after a restart.

use renderq_core::{Job, JobId, JobStatus, Task, TaskId, Worker, WorkerId};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A single durable fact applied to materialized state. One variant per
/// mutating `Store` operation in spec §4.1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalEntry {
    JobAdded(Job),
    JobUpdated(Job),
    JobDeleted(JobId),
    TaskAdded(Task),
    TaskUpdated(Task),
    WorkerUpserted(Worker),
    WorkerDeleted(WorkerId),
    /// Recorded for visibility only; job state in `JobUpdated` already
    /// carries the new status. Kept for log-based audit/debugging.
    JobStatusNote { job_id: JobId, status: JobStatus },
}

/// Append-only durability log backing a [`crate::Store`].
pub struct Wal {
    file: Option<File>,
    path: Option<PathBuf>,
}

impl Wal {
    /// Open (creating if absent) the log file at `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { file: Some(file), path: Some(path) })
    }

    /// An in-memory-only WAL that persists nothing. Used by tests and by
    /// embedders that only need the transactional-in-process guarantees.
    pub fn in_memory() -> Self {
        Self { file: None, path: None }
    }

    /// Append `entry`, fsync'ing before returning so the caller's mutation
    /// is durable once this call completes (spec §4.1 "every mutating call
    /// is atomic and durable before returning").
    pub fn append(&mut self, entry: &WalEntry) -> Result<()> {
        let Some(file) = self.file.as_mut() else { return Ok(()) };
        let line = serde_json::to_string(entry)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_data()?;
        Ok(())
    }

    /// Replay every entry in the log, in order, via `apply`.
    pub fn replay(path: impl AsRef<Path>, mut apply: impl FnMut(WalEntry)) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(());
        }
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: WalEntry = serde_json::from_str(&line)?;
            apply(entry);
        }
        Ok(())
    }

    /// Truncate the log to empty, used after a successful snapshot
    /// compaction (spec §4.1 "pluggable backend ... embedded relational vs
    /// in-memory + write-ahead log").
    pub fn truncate(&mut self) -> Result<()> {
        if let Some(path) = &self.path {
            self.file = Some(OpenOptions::new().create(true).write(true).truncate(true).open(path)?);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
