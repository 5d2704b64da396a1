// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference plugin modeled on an After Effects-style renderer: a frame
//! range is partitioned into fixed-size chunks, one Task per chunk, or a
//! caller-supplied render queue is partitioned one Task per queue item.

use indexmap::IndexMap;
use regex::Regex;
use renderq_core::{Job, Payload, Task};
use serde_json::{json, Value};

use crate::contract::{JobDescriptor, ParameterKind, ParameterSpec, Plugin, PluginInfo};
use crate::error::PluginError;

const DEFAULT_CHUNK_SIZE: i64 = 10;

/// Follow-up video format this job's render can be encoded to (SPEC_FULL §6
/// "multi-format follow-up fan-out").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Mp4,
    ProRes,
}

impl OutputFormat {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "mp4" => Some(Self::Mp4),
            "prores" => Some(Self::ProRes),
            _ => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::ProRes => "mov",
        }
    }

    fn codec(self) -> &'static str {
        match self {
            Self::Mp4 => "libx264",
            Self::ProRes => "prores_ks",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4 proxy",
            Self::ProRes => "ProRes master",
        }
    }
}

pub struct FrameChunkPlugin {
    progress_re: Regex,
}

impl FrameChunkPlugin {
    pub fn new() -> Self {
        Self {
            // aerender's "PROGRESS: <n>%" lines, and a fallback
            // "RenderQueueItem N" counter for builds that omit percentages.
            progress_re: Regex::new(r"PROGRESS:\s*(\d+(?:\.\d+)?)%").expect("static pattern is valid"),
        }
    }

    fn create_tasks_chunked(&self, job: &Job) -> Result<Vec<Task>, PluginError> {
        let start = job
            .plugin_data
            .get_i64("frame_start")
            .ok_or_else(|| PluginError::MissingParameter("frame_start".into()))?;
        let end = job
            .plugin_data
            .get_i64("frame_end")
            .ok_or_else(|| PluginError::MissingParameter("frame_end".into()))?;
        let chunk_size = job.plugin_data.get_i64("chunk_size").unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size <= 0 {
            return Err(PluginError::InvalidParameter { name: "chunk_size".into(), reason: "must be positive".into() });
        }

        let mut tasks = Vec::new();
        let mut index = 0u32;
        let mut chunk_start = start;
        while chunk_start <= end {
            let chunk_end = (chunk_start + chunk_size - 1).min(end);
            let task = Task::new(job.id, index, Some(chunk_start as u32), Some(chunk_end as u32), Payload::new())
                .map_err(|e| PluginError::Partition(e.to_string()))?;
            tasks.push(task);
            index += 1;
            chunk_start = chunk_end + 1;
        }
        Ok(tasks)
    }

    /// Partition a caller-supplied render queue: one Task per item, each
    /// carrying its own frame range and output path rather than a slice of a
    /// single shared range (SPEC_FULL §6 "render-queue mode").
    fn create_tasks_from_queue_items(&self, job: &Job) -> Result<Vec<Task>, PluginError> {
        let items = job
            .plugin_data
            .get("queue_items")
            .and_then(Value::as_array)
            .ok_or_else(|| PluginError::MissingParameter("queue_items".into()))?;
        if items.is_empty() {
            return Err(PluginError::InvalidParameter {
                name: "queue_items".into(),
                reason: "must not be empty".into(),
            });
        }

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let output_path = item.get("output_path").and_then(Value::as_str).ok_or_else(|| {
                    PluginError::InvalidParameter {
                        name: "queue_items".into(),
                        reason: format!("item {index} is missing output_path"),
                    }
                })?;
                let frame_start = item.get("frame_start").and_then(Value::as_i64).map(|v| v as u32);
                let frame_end = item.get("frame_end").and_then(Value::as_i64).map(|v| v as u32);

                let mut plugin_data = Payload::new();
                plugin_data.insert("output_path", output_path);
                if let Some(composition) = item.get("composition").and_then(Value::as_str) {
                    plugin_data.insert("composition", composition);
                }

                Task::new(job.id, index as u32, frame_start, frame_end, plugin_data)
                    .map_err(|e| PluginError::Partition(e.to_string()))
            })
            .collect()
    }

    fn output_formats(&self, job: &Job) -> Vec<OutputFormat> {
        if let Some(formats) = job.plugin_data.get("output_formats").and_then(Value::as_array) {
            return formats.iter().filter_map(Value::as_str).filter_map(OutputFormat::parse).collect();
        }
        if job.plugin_data.get_bool("encode_after").unwrap_or(false) {
            return vec![OutputFormat::Mp4];
        }
        Vec::new()
    }
}

impl Default for FrameChunkPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for FrameChunkPlugin {
    fn info(&self) -> PluginInfo {
        let mut parameters = IndexMap::new();
        parameters.insert("project_path".into(), ParameterSpec::required(ParameterKind::Path, "Project file"));
        parameters.insert("composition".into(), ParameterSpec::required(ParameterKind::String, "Composition name"));
        parameters.insert("frame_start".into(), ParameterSpec::required(ParameterKind::Int, "First frame"));
        parameters.insert("frame_end".into(), ParameterSpec::required(ParameterKind::Int, "Last frame"));
        parameters.insert("output_path".into(), ParameterSpec::required(ParameterKind::Path, "Output file pattern"));
        parameters.insert(
            "chunk_size".into(),
            ParameterSpec::optional(ParameterKind::Int, "Frames per task", json!(DEFAULT_CHUNK_SIZE)),
        );
        let mut mode = ParameterSpec::optional(ParameterKind::Choice, "Partitioning mode", json!("chunked"));
        mode.choices = Some(vec![json!("chunked"), json!("queue_items")]);
        mode.description =
            Some("\"chunked\" slices frame_start..frame_end; \"queue_items\" takes a caller-supplied queue_items list, one Task per item".into());
        parameters.insert("mode".into(), mode);
        parameters.insert(
            "encode_after".into(),
            ParameterSpec::optional(ParameterKind::Bool, "Queue an encode job on completion", json!(false)),
        );

        PluginInfo {
            name: "aftereffects".into(),
            display_name: "After Effects".into(),
            version: "1.0.0".into(),
            description: "Renders an After Effects composition by frame-range chunk, or a supplied render queue.".into(),
            parameters,
        }
    }

    fn validate(&self, parameters: &Payload) -> Result<(), String> {
        for key in ["project_path", "composition", "output_path"] {
            if parameters.get_str(key).is_none() {
                return Err(format!("missing required parameter: {key}"));
            }
        }

        if parameters.get_str("mode") == Some("queue_items") {
            match parameters.get("queue_items").and_then(Value::as_array) {
                Some(items) if !items.is_empty() => {}
                Some(_) => return Err("queue_items must not be empty".into()),
                None => return Err("missing required parameter: queue_items".into()),
            }
            return Ok(());
        }

        let start = parameters.get_i64("frame_start").ok_or("missing required parameter: frame_start")?;
        let end = parameters.get_i64("frame_end").ok_or("missing required parameter: frame_end")?;
        if start > end {
            return Err(format!("frame_start ({start}) must not exceed frame_end ({end})"));
        }
        if let Some(chunk_size) = parameters.get_i64("chunk_size") {
            if chunk_size <= 0 {
                return Err(format!("chunk_size ({chunk_size}) must be positive"));
            }
        }
        Ok(())
    }

    fn create_tasks(&self, job: &Job) -> Result<Vec<Task>, PluginError> {
        match job.plugin_data.get_str("mode") {
            Some("queue_items") => self.create_tasks_from_queue_items(job),
            _ => self.create_tasks_chunked(job),
        }
    }

    fn build_command(&self, task: &Task, job: &Job) -> Vec<String> {
        let project = job.plugin_data.get_str("project_path").unwrap_or_default();
        let composition = task.plugin_data.get_str("composition").or_else(|| job.plugin_data.get_str("composition")).unwrap_or_default();
        let output = task.plugin_data.get_str("output_path").or_else(|| job.plugin_data.get_str("output_path")).unwrap_or_default();
        let aerender = job.plugin_data.get_str("aerender_path").unwrap_or("aerender");
        vec![
            aerender.to_string(),
            "-project".into(),
            project.to_string(),
            "-comp".into(),
            composition.to_string(),
            "-s".into(),
            task.frame_start.unwrap_or(0).to_string(),
            "-e".into(),
            task.frame_end.unwrap_or(0).to_string(),
            "-output".into(),
            output.to_string(),
        ]
    }

    fn parse_progress(&self, line: &str, _task: &Task) -> Option<f64> {
        self.progress_re.captures(line).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse::<f64>().ok())
    }

    fn get_encoding_jobs(&self, job: &Job) -> Vec<JobDescriptor> {
        let formats = self.output_formats(job);
        if formats.is_empty() {
            return Vec::new();
        }
        let output_path = job.plugin_data.get_str("output_path").unwrap_or_default();

        formats
            .into_iter()
            .map(|format| {
                let mut plugin_data = Payload::new();
                plugin_data.insert("input_pattern", output_path);
                plugin_data.insert("output_path", format!("{output_path}.{}", format.extension()));
                plugin_data.insert("codec", format.codec());

                JobDescriptor {
                    name: format!("{} ({})", job.name, format.label()),
                    plugin: "ffmpeg".into(),
                    priority: Some(job.priority),
                    pool: Some(job.pool.clone()),
                    plugin_data,
                    metadata: Payload::new(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "frame_chunk_tests.rs"]
mod tests;
