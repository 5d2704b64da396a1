// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use renderq_core::{FakeClock, JobStatus, Payload, TaskStatus};
use serde_json::json;

fn params(plugin: &str, plugin_data: Payload) -> SubmitJobParams {
    SubmitJobParams {
        name: "test job".into(),
        plugin: plugin.into(),
        priority: None,
        pool: None,
        plugin_data,
        metadata: Payload::new(),
        dependent_on: Vec::new(),
    }
}

fn aftereffects_params() -> Payload {
    let mut data = Payload::new();
    data.insert("project_path", "/proj.aep");
    data.insert("composition", "Main");
    data.insert("output_path", "/out/frame_[####].png");
    data.insert("frame_start", 0);
    data.insert("frame_end", 9);
    data
}

#[test]
fn unknown_plugin_is_rejected_without_touching_the_store() {
    let store = Store::in_memory();
    let registry = renderq_plugins::reference_registry();
    let bus = EventBus::new();
    let clock = FakeClock::new();

    let result = submit_job(&store, &registry, &bus, &clock, params("nonexistent", Payload::new()));
    assert!(matches!(result, Err(CoordinatorError::UnknownPlugin(_))));
    assert!(store.list_jobs(Default::default(), 100, 0).is_empty());
}

#[test]
fn invalid_parameters_are_rejected_without_touching_the_store() {
    let store = Store::in_memory();
    let registry = renderq_plugins::reference_registry();
    let bus = EventBus::new();
    let clock = FakeClock::new();

    let result = submit_job(&store, &registry, &bus, &clock, params("aftereffects", Payload::new()));
    assert!(matches!(result, Err(CoordinatorError::ValidationFailed(_))));
    assert!(store.list_jobs(Default::default(), 100, 0).is_empty());
}

#[test]
fn valid_submission_creates_queued_job_with_tasks_and_emits_event() {
    let store = Store::in_memory();
    let registry = renderq_plugins::reference_registry();
    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let clock = FakeClock::new();

    let job = submit_job(&store, &registry, &bus, &clock, params("aftereffects", aftereffects_params())).unwrap();

    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.counts.task_total, 1);
    let tasks = store.list_tasks_by_job(&job.id);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status, TaskStatus::Pending);

    let event = rx.try_recv().unwrap();
    assert!(matches!(event, Event::JobSubmitted { job_id, .. } if job_id == job.id));
}

#[test]
fn partition_failure_discards_the_job_row() {
    let store = Store::in_memory();
    let registry = renderq_plugins::reference_registry();
    let bus = EventBus::new();
    let clock = FakeClock::new();

    let mut data = aftereffects_params();
    data.insert("chunk_size", json!(0));
    let result = submit_job(&store, &registry, &bus, &clock, params("aftereffects", data));

    assert!(matches!(result, Err(CoordinatorError::PartitionFailed(_))));
    assert!(store.list_jobs(Default::default(), 100, 0).is_empty());
}
