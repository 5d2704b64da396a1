// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use renderq_core::Job;
use serde_json::json;

fn job_with(frame_start: i64, frame_end: i64, chunk_size: Option<i64>) -> Job {
    let mut plugin_data = Payload::new();
    plugin_data.insert("project_path", "/proj.aep");
    plugin_data.insert("composition", "Main");
    plugin_data.insert("output_path", "/out/frame_[####].png");
    plugin_data.insert("frame_start", frame_start);
    plugin_data.insert("frame_end", frame_end);
    if let Some(size) = chunk_size {
        plugin_data.insert("chunk_size", size);
    }
    Job::builder().plugin("aftereffects").plugin_data(plugin_data).build()
}

#[test]
fn validate_rejects_missing_required_parameter() {
    let plugin = FrameChunkPlugin::new();
    let mut params = Payload::new();
    params.insert("project_path", "/proj.aep");
    assert!(plugin.validate(&params).is_err());
}

#[test]
fn validate_rejects_inverted_frame_range() {
    let plugin = FrameChunkPlugin::new();
    let mut params = Payload::new();
    params.insert("project_path", "/proj.aep");
    params.insert("composition", "Main");
    params.insert("output_path", "/out.png");
    params.insert("frame_start", 10);
    params.insert("frame_end", 5);
    assert!(plugin.validate(&params).is_err());
}

#[test]
fn create_tasks_chunks_frame_range_evenly() {
    let plugin = FrameChunkPlugin::new();
    let job = job_with(0, 99, Some(10));
    let tasks = plugin.create_tasks(&job).unwrap();
    assert_eq!(tasks.len(), 10);
    assert_eq!(tasks[0].frame_start, Some(0));
    assert_eq!(tasks[0].frame_end, Some(9));
    assert_eq!(tasks[9].frame_start, Some(90));
    assert_eq!(tasks[9].frame_end, Some(99));
}

#[test]
fn create_tasks_last_chunk_may_be_shorter() {
    let plugin = FrameChunkPlugin::new();
    let job = job_with(0, 24, Some(10));
    let tasks = plugin.create_tasks(&job).unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[2].frame_start, Some(20));
    assert_eq!(tasks[2].frame_end, Some(24));
}

#[test]
fn create_tasks_single_frame_job_makes_one_task() {
    let plugin = FrameChunkPlugin::new();
    let job = job_with(5, 5, None);
    let tasks = plugin.create_tasks(&job).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].frame_start, Some(5));
    assert_eq!(tasks[0].frame_end, Some(5));
}

#[test]
fn create_tasks_rejects_non_positive_chunk_size() {
    let plugin = FrameChunkPlugin::new();
    let job = job_with(0, 10, Some(0));
    assert!(matches!(plugin.create_tasks(&job), Err(PluginError::InvalidParameter { .. })));
}

#[test]
fn build_command_embeds_task_frame_range() {
    let plugin = FrameChunkPlugin::new();
    let job = job_with(0, 9, Some(10));
    let task = &plugin.create_tasks(&job).unwrap()[0];
    let command = plugin.build_command(task, &job);
    assert!(command.contains(&"Main".to_string()));
    assert!(command.contains(&"0".to_string()));
    assert!(command.contains(&"9".to_string()));
}

#[test]
fn parse_progress_reads_percent_marker() {
    let plugin = FrameChunkPlugin::new();
    let job = job_with(0, 9, None);
    let task = &plugin.create_tasks(&job).unwrap()[0];
    assert_eq!(plugin.parse_progress("PROGRESS: 42%", task), Some(42.0));
    assert_eq!(plugin.parse_progress("some unrelated log line", task), None);
}

#[test]
fn get_encoding_jobs_empty_unless_requested() {
    let plugin = FrameChunkPlugin::new();
    let job = job_with(0, 9, None);
    assert!(plugin.get_encoding_jobs(&job).is_empty());

    let mut plugin_data = job.plugin_data.clone();
    plugin_data.insert("encode_after", json!(true));
    let job = Job::builder().plugin("aftereffects").plugin_data(plugin_data).build();
    let followups = plugin.get_encoding_jobs(&job);
    assert_eq!(followups.len(), 1);
    assert_eq!(followups[0].plugin, "ffmpeg");
}

#[test]
fn get_encoding_jobs_fans_out_multiple_output_formats() {
    let plugin = FrameChunkPlugin::new();
    let job = job_with(0, 9, None);
    let mut plugin_data = job.plugin_data.clone();
    plugin_data.insert("output_formats", json!(["prores", "mp4"]));
    let job = Job::builder().plugin("aftereffects").plugin_data(plugin_data).build();

    let followups = plugin.get_encoding_jobs(&job);
    assert_eq!(followups.len(), 2);
    assert!(followups.iter().all(|f| f.plugin == "ffmpeg"));
    assert!(followups[0].plugin_data.get_str("output_path").unwrap().ends_with(".mov"));
    assert!(followups[1].plugin_data.get_str("output_path").unwrap().ends_with(".mp4"));
}

#[test]
fn queue_items_mode_creates_one_task_per_item_with_its_own_output_path() {
    let plugin = FrameChunkPlugin::new();
    let mut plugin_data = Payload::new();
    plugin_data.insert("project_path", "/proj.aep");
    plugin_data.insert("composition", "Main");
    plugin_data.insert("output_path", "/out/frame_[####].png");
    plugin_data.insert("mode", "queue_items");
    plugin_data.insert(
        "queue_items",
        json!([
            {"frame_start": 0, "frame_end": 9, "output_path": "/out/shot_a.png"},
            {"frame_start": 0, "frame_end": 24, "output_path": "/out/shot_b.png"},
        ]),
    );
    let job = Job::builder().plugin("aftereffects").plugin_data(plugin_data).build();

    let tasks = plugin.create_tasks(&job).unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].plugin_data.get_str("output_path"), Some("/out/shot_a.png"));
    assert_eq!(tasks[1].frame_end, Some(24));

    let command = plugin.build_command(&tasks[0], &job);
    assert!(command.contains(&"/out/shot_a.png".to_string()));
}

#[test]
fn queue_items_mode_rejects_empty_list() {
    let plugin = FrameChunkPlugin::new();
    let mut plugin_data = Payload::new();
    plugin_data.insert("project_path", "/proj.aep");
    plugin_data.insert("composition", "Main");
    plugin_data.insert("output_path", "/out.png");
    plugin_data.insert("mode", "queue_items");
    plugin_data.insert("queue_items", json!([]));
    let job = Job::builder().plugin("aftereffects").plugin_data(plugin_data).build();

    assert!(matches!(plugin.create_tasks(&job), Err(PluginError::InvalidParameter { .. })));
}

#[test]
fn validate_requires_queue_items_when_mode_is_queue_items() {
    let plugin = FrameChunkPlugin::new();
    let mut params = Payload::new();
    params.insert("project_path", "/proj.aep");
    params.insert("composition", "Main");
    params.insert("output_path", "/out.png");
    params.insert("mode", "queue_items");
    assert!(plugin.validate(&params).is_err());
}
