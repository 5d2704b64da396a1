// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The plugin contract (spec §4.6): a polymorphic object identified by a
//! unique `name`, with display metadata, a declared parameter schema, and a
//! fixed set of operations.

use indexmap::IndexMap;
use renderq_core::{Job, Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PluginError;

/// Primitive type a submission parameter is validated/rendered as. The
/// client-side form generator drives off this; the coordinator only uses it
/// for basic required/type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    String,
    Int,
    Float,
    Bool,
    Path,
    Choice,
}

/// One entry of a plugin's declared parameter schema (spec §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    pub label: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save: Option<bool>,
}

impl ParameterSpec {
    pub fn required(kind: ParameterKind, label: impl Into<String>) -> Self {
        Self { kind, label: label.into(), required: true, default: None, choices: None, description: None, filter: None, save: None }
    }

    pub fn optional(kind: ParameterKind, label: impl Into<String>, default: Value) -> Self {
        Self { kind, label: label.into(), required: false, default: Some(default), choices: None, description: None, filter: None, save: None }
    }
}

/// Display metadata and the declared parameter schema returned by
/// introspection endpoints (spec §6 "list plugins").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub display_name: String,
    pub version: String,
    pub description: String,
    pub parameters: IndexMap<String, ParameterSpec>,
}

/// A follow-up Job descriptor returned by `get_encoding_jobs` (spec §4.5).
/// `priority`/`pool` default to the originating Job's when omitted.
#[derive(Debug, Clone)]
pub struct JobDescriptor {
    pub name: String,
    pub plugin: String,
    pub priority: Option<i32>,
    pub pool: Option<String>,
    pub plugin_data: renderq_core::Payload,
    pub metadata: renderq_core::Payload,
}

/// The rendering-plugin contract. Every operation is always present —
/// optional hooks have default no-op bodies rather than being discovered by
/// reflection (spec §9).
pub trait Plugin: Send + Sync {
    fn info(&self) -> PluginInfo;

    fn name(&self) -> String {
        self.info().name
    }

    /// Pure predicate on the submission's parameter mapping (spec §4.6
    /// "Required-field and cross-field checks"). `Ok(())` means valid;
    /// `Err(message)` is surfaced to the submitter as `validation_failed`.
    fn validate(&self, parameters: &renderq_core::Payload) -> Result<(), String>;

    /// Partition `job` into its executable Tasks. Must be deterministic
    /// given identical inputs (spec §4.6).
    fn create_tasks(&self, job: &Job) -> Result<Vec<Task>, PluginError>;

    /// Build the argument vector to execute on a worker, using worker-local
    /// paths (spec §4.6 — this runs on the worker, not the coordinator).
    fn build_command(&self, task: &Task, job: &Job) -> Vec<String>;

    /// Parse one line of child-process output into a progress estimate, if
    /// the line conveys one (spec §4.6).
    fn parse_progress(&self, line: &str, task: &Task) -> Option<f64>;

    fn on_task_start(&self, _task: &Task) {}
    fn on_task_complete(&self, _task: &Task) {}
    fn on_task_fail(&self, _task: &Task) {}
    fn on_job_complete(&self, _job: &Job) {}

    /// Dependent Jobs to create once `job` completes (spec §4.5). Plugins
    /// that don't define follow-ups return empty.
    fn get_encoding_jobs(&self, _job: &Job) -> Vec<JobDescriptor> {
        Vec::new()
    }
}
