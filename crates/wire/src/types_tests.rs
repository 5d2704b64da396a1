// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use renderq_core::{Job, JobStatus, Task, TaskStatus, Worker};

#[test]
fn job_summary_from_job_copies_public_fields() {
    let job = Job::builder().name("shot_010").plugin("aftereffects").build();
    let summary = JobSummary::from(&job);

    assert_eq!(summary.id, job.id);
    assert_eq!(summary.name, "shot_010");
    assert_eq!(summary.plugin, "aftereffects");
    assert_eq!(summary.status, JobStatus::Pending);
}

#[test]
fn job_detail_embeds_its_tasks() {
    let job = Job::builder().name("shot_010").build();
    let task = Task::builder(job.id).index(0).build();
    let detail = JobDetail::new(&job, vec![TaskDetail::from(&task)]);

    assert_eq!(detail.tasks.len(), 1);
    assert_eq!(detail.tasks[0].job_id, job.id);
}

#[test]
fn worker_summary_from_worker_copies_capacity_fields() {
    let worker = Worker::register(
        renderq_core::worker::fingerprint("render-01", "00:11:22:33:44:55"),
        "render-01",
        "render-01",
        "10.0.0.5",
        vec!["default".into()],
        Vec::new(),
        16,
        65536,
        "1.0.0",
        0,
    );
    let summary = WorkerSummary::from(&worker);

    assert_eq!(summary.hostname, "render-01");
    assert_eq!(summary.status, worker.status);
}

#[test]
fn parameter_spec_wire_skips_absent_optionals() {
    let spec = ParameterSpecWire {
        kind: ParameterKindWire::Int,
        label: "Frame chunk size".into(),
        required: false,
        default: None,
        choices: None,
        description: None,
    };
    let json = serde_json::to_value(&spec).expect("serialize failed");
    assert!(json.get("default").is_none());
    assert!(json.get("description").is_none());
    assert_eq!(json["type"], "int");
}

#[test]
fn task_detail_from_task_reflects_initial_state() {
    let job = Job::builder().build();
    let task = Task::builder(job.id).index(3).build();
    let detail = TaskDetail::from(&task);

    assert_eq!(detail.index, 3);
    assert_eq!(detail.status, TaskStatus::Pending);
    assert!(detail.assigned_worker.is_none());
}
