// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use renderq_core::{FakeClock, JobStatus, Payload, TaskStatus, WorkerStatus};
use renderq_plugins::reference_registry;
use std::time::Duration;

use crate::worker_protocol::{self, RegisterParams};

fn register(store: &Store, events: &EventBus, clock: &FakeClock) -> renderq_core::Worker {
    worker_protocol::register_worker(
        store,
        events,
        clock,
        RegisterParams {
            hostname: "render-01".into(),
            mac_address: "aa:bb:cc:dd:ee:ff".into(),
            ip_address: "10.0.0.5".into(),
            pools: vec!["default".into()],
            capabilities: Vec::new(),
            cpu_cores: 8,
            memory_total_mb: 16_000,
            version: "1.0.0".into(),
        },
    )
    .unwrap()
}

fn submit(store: &Store, registry: &PluginRegistry, events: &EventBus, clock: &FakeClock, plugin: &str, plugin_data: Payload) -> Job {
    submission::submit_job(
        store,
        registry,
        events,
        clock,
        SubmitJobParams {
            name: "test-job".into(),
            plugin: plugin.into(),
            priority: None,
            pool: None,
            plugin_data,
            metadata: Payload::new(),
            dependent_on: Vec::new(),
        },
    )
    .unwrap()
}

fn ffmpeg_payload() -> Payload {
    let mut p = Payload::new();
    p.insert("input_pattern", "render_%04d.exr");
    p.insert("output_path", "out.mp4");
    p
}

fn aftereffects_payload(encode_after: bool) -> Payload {
    let mut p = Payload::new();
    p.insert("project_path", "shot.aep");
    p.insert("composition", "main");
    p.insert("frame_start", 0);
    p.insert("frame_end", 0);
    p.insert("output_path", "shot_[####].exr");
    p.insert("encode_after", encode_after);
    p
}

#[test]
fn timed_out_worker_is_marked_offline_and_releases_its_task() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let mut rx = events.subscribe();
    let clock = FakeClock::new();
    let registry = reference_registry();

    let worker = register(&store, &events, &clock);
    let _ = rx.try_recv(); // WorkerConnected

    submit(&store, &registry, &events, &clock, "ffmpeg", ffmpeg_payload());
    let _ = rx.try_recv(); // JobSubmitted
    let task = worker_protocol::pull_task(&store, &events, &clock, &worker.id).unwrap().unwrap();
    let _ = rx.try_recv(); // TaskAssigned
    let _ = rx.try_recv(); // JobStarted

    clock.advance(Duration::from_secs(120));
    let summary = run_tick(&store, &registry, &events, &clock, 60);
    assert_eq!(summary.workers_timed_out, 1);

    let worker_after = store.get_worker(&worker.id).unwrap();
    assert_eq!(worker_after.status, WorkerStatus::Offline);
    let task_after = store.get_task(&task.id).unwrap();
    assert_eq!(task_after.status, TaskStatus::Pending);
    assert!(task_after.assigned_worker.is_none());
    assert!(matches!(rx.try_recv().unwrap(), Event::WorkerDisconnected { .. }));
}

#[test]
fn an_idle_or_disabled_worker_is_never_swept() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let clock = FakeClock::new();
    let registry = reference_registry();

    let worker = register(&store, &events, &clock);
    store.disable_worker(&worker.id).unwrap();
    clock.advance(Duration::from_secs(3600));

    let summary = run_tick(&store, &registry, &events, &clock, 60);
    assert_eq!(summary.workers_timed_out, 0);
    assert_eq!(store.get_worker(&worker.id).unwrap().status, WorkerStatus::Disabled);
}

#[test]
fn job_completes_once_every_task_is_done() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let mut rx = events.subscribe();
    let clock = FakeClock::new();
    let registry = reference_registry();

    let job = submit(&store, &registry, &events, &clock, "ffmpeg", ffmpeg_payload());
    let _ = rx.try_recv(); // JobSubmitted
    let worker = register(&store, &events, &clock);
    let _ = rx.try_recv(); // WorkerConnected
    let task = worker_protocol::pull_task(&store, &events, &clock, &worker.id).unwrap().unwrap();
    let _ = rx.try_recv(); // TaskAssigned
    let _ = rx.try_recv(); // JobStarted
    worker_protocol::complete_task(&store, &events, &clock, &task.id, 0).unwrap();
    let _ = rx.try_recv(); // TaskCompleted

    let summary = run_tick(&store, &registry, &events, &clock, 60);
    assert_eq!(summary.jobs_completed, 1);

    let job_after = store.get_job(&job.id).unwrap();
    assert_eq!(job_after.status, JobStatus::Completed);
    assert_eq!(job_after.progress, 100.0);
    assert!(matches!(rx.try_recv().unwrap(), Event::JobCompleted { .. }));
}

#[test]
fn job_fails_once_a_task_fails_with_no_pending_work_left() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let mut rx = events.subscribe();
    let clock = FakeClock::new();
    let registry = reference_registry();

    let job = submit(&store, &registry, &events, &clock, "ffmpeg", ffmpeg_payload());
    let _ = rx.try_recv();
    let worker = register(&store, &events, &clock);
    let _ = rx.try_recv();
    let task = worker_protocol::pull_task(&store, &events, &clock, &worker.id).unwrap().unwrap();
    let _ = rx.try_recv();
    let _ = rx.try_recv();
    worker_protocol::fail_task(&store, &events, &clock, &task.id, Some(1), "encoder crashed".into()).unwrap();
    let _ = rx.try_recv(); // TaskFailed

    let summary = run_tick(&store, &registry, &events, &clock, 60);
    assert_eq!(summary.jobs_failed, 1);

    let job_after = store.get_job(&job.id).unwrap();
    assert_eq!(job_after.status, JobStatus::Failed);
    assert!(matches!(rx.try_recv().unwrap(), Event::JobFailed { .. }));
}

#[test]
fn an_in_progress_job_only_gets_a_progress_update() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let mut rx = events.subscribe();
    let clock = FakeClock::new();
    let registry = reference_registry();

    let mut chunked = aftereffects_payload(false);
    chunked.insert("frame_start", 0);
    chunked.insert("frame_end", 19);
    chunked.insert("chunk_size", 10);
    let job = submit(&store, &registry, &events, &clock, "aftereffects", chunked);
    let _ = rx.try_recv();
    let worker = register(&store, &events, &clock);
    let _ = rx.try_recv();
    let task = worker_protocol::pull_task(&store, &events, &clock, &worker.id).unwrap().unwrap();
    let _ = rx.try_recv();
    let _ = rx.try_recv();
    worker_protocol::complete_task(&store, &events, &clock, &task.id, 0).unwrap();
    let _ = rx.try_recv();

    let summary = run_tick(&store, &registry, &events, &clock, 60);
    assert_eq!(summary.jobs_completed, 0);
    assert_eq!(summary.jobs_failed, 0);
    let job_after = store.get_job(&job.id).unwrap();
    assert_eq!(job_after.status, JobStatus::Active);
    assert_eq!(job_after.progress, 50.0);
    assert!(matches!(rx.try_recv().unwrap(), Event::JobProgress { progress, .. } if progress == 50.0));
}

#[test]
fn completed_job_spawns_a_followup_when_its_plugin_declares_one() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let mut rx = events.subscribe();
    let clock = FakeClock::new();
    let registry = reference_registry();

    let job = submit(&store, &registry, &events, &clock, "aftereffects", aftereffects_payload(true));
    let _ = rx.try_recv();
    let worker = register(&store, &events, &clock);
    let _ = rx.try_recv();
    let task = worker_protocol::pull_task(&store, &events, &clock, &worker.id).unwrap().unwrap();
    let _ = rx.try_recv();
    let _ = rx.try_recv();
    worker_protocol::complete_task(&store, &events, &clock, &task.id, 0).unwrap();
    let _ = rx.try_recv();

    let summary = run_tick(&store, &registry, &events, &clock, 60);
    assert_eq!(summary.jobs_completed, 1);
    assert_eq!(summary.followups_created, 1);

    let jobs = store.list_jobs(JobFilter::default(), usize::MAX, 0);
    let followup = jobs.iter().find(|j| j.id != job.id).expect("follow-up job should exist");
    assert_eq!(followup.plugin, "ffmpeg");
    assert_eq!(followup.dependent_on, vec![job.id]);
    assert_eq!(followup.status, JobStatus::Queued);
}

#[test]
fn a_pending_job_with_no_tasks_is_left_alone() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let clock = FakeClock::new();
    let registry = reference_registry();

    let job = renderq_core::Job::builder().build();
    store.add_job(job).unwrap();

    let summary = run_tick(&store, &registry, &events, &clock, 60);
    assert_eq!(summary.jobs_completed, 0);
    assert_eq!(summary.jobs_failed, 0);
}
