// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! renderq-store: durable, transactionally consistent persistence of Jobs,
//! Tasks and Workers (spec §4.1). A single [`Store`] is the sole in-process
//! authority for mutations; every other component reaches the entity tables
//! only through it.
//!
//! Durability is WAL-first: every mutating call appends an entry to an
//! append-only log before it is applied to the in-memory materialized
//! state, and the whole operation runs under one lock so partial states are
//! never observable (spec §5 "Ordering guarantees"). A periodic snapshot
//! compacts the WAL so restart replay stays bounded.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod dispatch;
mod error;
mod snapshot;
mod state;
mod store;
mod wal;

pub use error::StoreError;
pub use snapshot::{Snapshot, CURRENT_SNAPSHOT_VERSION};
pub use state::{JobFilter, MaterializedState, StatsSnapshot, WorkerTelemetry};
pub use store::Store;
pub use wal::{Wal, WalEntry};
