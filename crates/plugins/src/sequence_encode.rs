// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference plugin modeled on an ffmpeg-style encoder: a frame sequence is
//! encoded to a single output file in one Task (no chunking — the codec
//! needs the whole sequence in one pass).

use indexmap::IndexMap;
use regex::Regex;
use renderq_core::{Job, Payload, Task};
use serde_json::json;

use crate::contract::{JobDescriptor, ParameterKind, ParameterSpec, Plugin, PluginInfo};
use crate::error::PluginError;

pub struct SequenceEncodePlugin {
    frame_re: Regex,
}

impl SequenceEncodePlugin {
    pub fn new() -> Self {
        Self {
            frame_re: Regex::new(r"frame=\s*(\d+)").expect("static pattern is valid"),
        }
    }
}

impl Default for SequenceEncodePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SequenceEncodePlugin {
    fn info(&self) -> PluginInfo {
        let mut parameters = IndexMap::new();
        parameters.insert("input_pattern".into(), ParameterSpec::required(ParameterKind::Path, "Input frame pattern"));
        parameters.insert("output_path".into(), ParameterSpec::required(ParameterKind::Path, "Output file"));
        parameters.insert(
            "framerate".into(),
            ParameterSpec::optional(ParameterKind::Int, "Output framerate", json!(24)),
        );
        parameters.insert(
            "codec".into(),
            ParameterSpec::optional(ParameterKind::String, "Video codec", json!("libx264")),
        );
        parameters.insert(
            "total_frames".into(),
            ParameterSpec::optional(ParameterKind::Int, "Frame count, for progress estimation", json!(0)),
        );

        PluginInfo {
            name: "ffmpeg".into(),
            display_name: "ffmpeg Sequence Encode".into(),
            version: "1.0.0".into(),
            description: "Encodes a rendered frame sequence into a single video file.".into(),
            parameters,
        }
    }

    fn validate(&self, parameters: &Payload) -> Result<(), String> {
        for key in ["input_pattern", "output_path"] {
            if parameters.get_str(key).is_none() {
                return Err(format!("missing required parameter: {key}"));
            }
        }
        if let Some(framerate) = parameters.get_i64("framerate") {
            if framerate <= 0 {
                return Err(format!("framerate ({framerate}) must be positive"));
            }
        }
        Ok(())
    }

    fn create_tasks(&self, job: &Job) -> Result<Vec<Task>, PluginError> {
        if job.plugin_data.get_str("input_pattern").is_none() {
            return Err(PluginError::MissingParameter("input_pattern".into()));
        }
        let mut plugin_data = Payload::new();
        if let Some(total) = job.plugin_data.get_i64("total_frames") {
            plugin_data.insert("total_frames", total);
        }
        let task = Task::new(job.id, 0, None, None, plugin_data).map_err(|e| PluginError::Partition(e.to_string()))?;
        Ok(vec![task])
    }

    fn build_command(&self, _task: &Task, job: &Job) -> Vec<String> {
        let input = job.plugin_data.get_str("input_pattern").unwrap_or_default();
        let output = job.plugin_data.get_str("output_path").unwrap_or_default();
        let framerate = job.plugin_data.get_i64("framerate").unwrap_or(24);
        let codec = job.plugin_data.get_str("codec").unwrap_or("libx264");
        vec![
            "ffmpeg".into(),
            "-framerate".into(),
            framerate.to_string(),
            "-i".into(),
            input.to_string(),
            "-c:v".into(),
            codec.to_string(),
            output.to_string(),
        ]
    }

    fn parse_progress(&self, line: &str, task: &Task) -> Option<f64> {
        let frame = self.frame_re.captures(line)?.get(1)?.as_str().parse::<f64>().ok()?;
        let total = task.plugin_data.get_f64("total_frames").filter(|t| *t > 0.0)?;
        Some((frame / total * 100.0).clamp(0.0, 100.0))
    }

    fn get_encoding_jobs(&self, _job: &Job) -> Vec<JobDescriptor> {
        Vec::new()
    }
}

#[cfg(test)]
#[path = "sequence_encode_tests.rs"]
mod tests;
