// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence: a point-in-time, zstd-compressed copy of
//! [`MaterializedState`] that bounds WAL replay time after a restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::state::MaterializedState;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(state: MaterializedState) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, state, created_at: Utc::now() }
    }

    /// Write the snapshot to `path`, zstd-compressed, then atomically
    /// replace any existing file via rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_vec(self)?;
        let compressed = zstd::encode_all(json.as_slice(), 3)?;
        let tmp = path.with_extension("tmp");
        fs::File::create(&tmp)?.write_all(&compressed)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let compressed = fs::read(path)?;
        let json = zstd::decode_all(compressed.as_slice())?;
        Ok(Some(serde_json::from_slice(&json)?))
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
