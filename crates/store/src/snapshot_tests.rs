// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use renderq_core::Job;
use tempfile::tempdir;

#[test]
fn save_and_load_roundtrips_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snap.zst");

    let mut state = MaterializedState::default();
    let job = Job::builder().name("snapshot-me").build();
    let job_id = job.id;
    state.apply(&crate::wal::WalEntry::JobAdded(job));

    let snapshot = Snapshot::new(state);
    snapshot.save(&path).unwrap();

    let loaded = Snapshot::load(&path).unwrap().unwrap();
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
    assert!(loaded.state.get_job(&job_id).is_some());
}

#[test]
fn load_of_missing_file_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.zst");
    assert!(Snapshot::load(&path).unwrap().is_none());
}
