// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Worker entity, its state machine, and the stable fingerprint helper
//! (spec §3, §4.2, §4.8; SPEC_FULL §6 "stable worker-fingerprint helper").

use crate::error::CoreError;
use crate::task::TaskId;
use sha2::{Digest, Sha256};

crate::define_id! {
    /// Identifies a Worker. Stable across reconnects — derived from a host
    /// fingerprint rather than a fresh random value, so in-flight Tasks can
    /// be re-associated with a returning Worker (spec §9 re-architecture
    /// note). See [`fingerprint`].
    pub struct WorkerId("wkr-");
}

/// Derive a stable [`WorkerId`] from host identifiers, mirroring the
/// original worker agent's `sha256(hostname + mac)[:16] -> UUID` scheme.
/// The same `(hostname, mac_address)` pair always yields the same id.
pub fn fingerprint(hostname: &str, mac_address: &str) -> WorkerId {
    let mut hasher = Sha256::new();
    hasher.update(hostname.as_bytes());
    hasher.update(mac_address.as_bytes());
    let digest = hasher.finalize();
    let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
    // WorkerId total length is capped at ID_MAX_LEN; take a prefix of the
    // hex digest long enough to make collisions practically impossible
    // within that budget.
    let suffix_len = crate::id::ID_MAX_LEN - WorkerId::PREFIX.len();
    WorkerId::from_string(format!("{}{}", WorkerId::PREFIX, &hex[..suffix_len]))
}

/// Worker lifecycle status.
///
/// ```text
/// (new)    -> idle          (register)
/// idle     -> busy          (task assigned)
/// busy     -> idle          (task completed/failed, or cancel/suspend releases)
/// any      -> offline       (heartbeat timeout)
/// any      -> disabled      (admin)   disabled -> idle (admin)
/// offline  -> idle          (re-register)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Idle,
    Busy,
    Offline,
    Disabled,
}

crate::simple_display! {
    WorkerStatus {
        Idle => "idle",
        Busy => "busy",
        Offline => "offline",
        Disabled => "disabled",
    }
}

impl WorkerStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        use WorkerStatus::*;
        match (self, next) {
            (Idle, Busy) => true,
            (Busy, Idle) => true,
            (Disabled, Idle) => true,
            (Offline, Idle) => true,
            (_, Offline) if self != Offline => true,
            (_, Disabled) if self != Disabled => true,
            _ => false,
        }
    }

    fn checked_transition(self, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::IllegalWorkerTransition { from: self, to: next })
        }
    }
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// A long-lived agent on a render host that pulls and executes Tasks.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub hostname: String,
    pub ip_address: String,
    pub version: String,
    pub cpu_cores: u32,
    pub memory_total_mb: u64,

    /// Ordered set of pool names this worker serves.
    pub pools: Vec<String>,
    /// Plugin capability names this worker can execute. Empty means "any".
    pub capabilities: Vec<String>,

    pub status: WorkerStatus,
    pub current_task: Option<TaskId>,
    pub cpu_usage_pct: f64,
    pub memory_used_mb: u64,
    pub last_heartbeat: u64,
}

impl Worker {
    /// Upsert-on-register (spec §4.8 "Register" — idempotent).
    pub fn register(
        id: WorkerId,
        name: impl Into<String>,
        hostname: impl Into<String>,
        ip_address: impl Into<String>,
        pools: Vec<String>,
        capabilities: Vec<String>,
        cpu_cores: u32,
        memory_total_mb: u64,
        version: impl Into<String>,
        now: u64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            hostname: hostname.into(),
            ip_address: ip_address.into(),
            version: version.into(),
            cpu_cores,
            memory_total_mb,
            pools,
            capabilities,
            status: WorkerStatus::Idle,
            current_task: None,
            cpu_usage_pct: 0.0,
            memory_used_mb: 0,
            last_heartbeat: now,
        }
    }

    /// Whether this worker may serve Tasks from `pool`, gated by capability
    /// `plugin` when this worker declares any capabilities at all (spec
    /// §4.3 step 2).
    pub fn can_serve(&self, pool: &str, plugin: &str) -> bool {
        self.pools.iter().any(|p| p == pool)
            && (self.capabilities.is_empty() || self.capabilities.iter().any(|c| c == plugin))
    }

    pub fn heartbeat(&mut self, cpu_usage_pct: f64, memory_used_mb: u64, now: u64) {
        self.cpu_usage_pct = cpu_usage_pct;
        self.memory_used_mb = memory_used_mb;
        self.last_heartbeat = now;
        if self.status == WorkerStatus::Offline {
            self.status = WorkerStatus::Idle;
        }
    }

    pub fn assign(&mut self, task: TaskId) -> Result<(), CoreError> {
        self.status = self.status.checked_transition(WorkerStatus::Busy)?;
        self.current_task = Some(task);
        Ok(())
    }

    pub fn release(&mut self) -> Result<(), CoreError> {
        self.status = self.status.checked_transition(WorkerStatus::Idle)?;
        self.current_task = None;
        Ok(())
    }

    pub fn mark_offline(&mut self) -> Result<(), CoreError> {
        self.status = self.status.checked_transition(WorkerStatus::Offline)?;
        Ok(())
    }

    pub fn disable(&mut self) -> Result<(), CoreError> {
        self.status = self.status.checked_transition(WorkerStatus::Disabled)?;
        Ok(())
    }

    pub fn enable(&mut self) -> Result<(), CoreError> {
        self.status = self.status.checked_transition(WorkerStatus::Idle)?;
        Ok(())
    }

    /// Deletion is only legal once a worker is offline or disabled (spec §3
    /// "Deletion requires status offline or disabled").
    pub fn deletable(&self) -> bool {
        matches!(self.status, WorkerStatus::Offline | WorkerStatus::Disabled)
    }

    pub fn timed_out(&self, now: u64, timeout_secs: u64) -> bool {
        now.saturating_sub(self.last_heartbeat) > timeout_secs * 1000
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
