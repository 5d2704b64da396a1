// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors a plugin may raise while partitioning a Job (spec §7
/// `partition_failed`). Caught at the call site and converted to a
/// failed-state record; never propagated as a panic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("partitioning failed: {0}")]
    Partition(String),
}
