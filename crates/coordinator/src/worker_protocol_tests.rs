// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use renderq_core::{FakeClock, Job, JobStatus, Payload, WorkerStatus};

fn register(store: &Store, events: &EventBus, clock: &FakeClock) -> Worker {
    register_worker(
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

fn queued_job_with_task(store: &Store) -> (renderq_core::JobId, renderq_core::TaskId) {
    let job = Job::builder().plugin_data(Payload::new()).build();
    let mut job = job;
    job.status = JobStatus::Queued;
    job.counts.task_total = 1;
    store.add_job(job.clone()).unwrap();
    let task = renderq_core::Task::builder(job.id).build();
    store.add_task(task.clone()).unwrap();
    (job.id, task.id)
}

#[test]
fn register_twice_is_idempotent_and_returns_the_same_id() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let clock = FakeClock::new();

    let first = register(&store, &events, &clock);
    let second = register(&store, &events, &clock);
    assert_eq!(first.id, second.id);
    assert_eq!(second.status, WorkerStatus::Idle);
}

#[test]
fn pull_assigns_a_task_and_emits_assigned_event() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let mut rx = events.subscribe();
    let clock = FakeClock::new();

    let worker = register(&store, &events, &clock);
    let _ = rx.try_recv(); // WorkerConnected

    let (_, task_id) = queued_job_with_task(&store);
    let task = pull_task(&store, &events, &clock, &worker.id).unwrap();
    assert_eq!(task.unwrap().id, task_id);
    assert!(matches!(rx.try_recv().unwrap(), Event::TaskAssigned { .. }));
    assert!(matches!(rx.try_recv().unwrap(), Event::JobStarted { .. }));
}

#[test]
fn pull_with_nothing_eligible_returns_none() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let clock = FakeClock::new();
    let worker = register(&store, &events, &clock);

    assert!(pull_task(&store, &events, &clock, &worker.id).unwrap().is_none());
}

#[test]
fn full_task_lifecycle_emits_matching_events() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let mut rx = events.subscribe();
    let clock = FakeClock::new();

    let worker = register(&store, &events, &clock);
    let _ = rx.try_recv();
    let (_, _) = queued_job_with_task(&store);
    let task = pull_task(&store, &events, &clock, &worker.id).unwrap().unwrap();
    let _ = rx.try_recv();

    start_task(&store, &events, &clock, &task.id).unwrap();
    assert!(matches!(rx.try_recv().unwrap(), Event::TaskStarted { .. }));

    report_progress(&store, &events, &clock, &task.id, 50.0).unwrap();
    assert!(matches!(rx.try_recv().unwrap(), Event::TaskProgress { progress, .. } if progress == 50.0));

    complete_task(&store, &events, &clock, &task.id, 0).unwrap();
    assert!(matches!(rx.try_recv().unwrap(), Event::TaskCompleted { .. }));

    let worker_after = store.get_worker(&worker.id).unwrap();
    assert_eq!(worker_after.status, WorkerStatus::Idle);
}

#[test]
fn heartbeat_updates_telemetry_and_emits_event() {
    let store = Store::in_memory();
    let events = EventBus::new();
    let mut rx = events.subscribe();
    let clock = FakeClock::new();
    let worker = register(&store, &events, &clock);
    let _ = rx.try_recv();

    let updated = heartbeat(&store, &events, &clock, &worker.id, 42.0, 2048).unwrap();
    assert_eq!(updated.cpu_usage_pct, 42.0);
    assert!(matches!(rx.try_recv().unwrap(), Event::WorkerHeartbeat { .. }));
}

#[test]
fn upload_task_log_records_the_path() {
    let store = Store::in_memory();
    let (_, task_id) = queued_job_with_task(&store);
    let task = upload_task_log(&store, &task_id, "/var/log/renderq/task.log".into()).unwrap();
    assert_eq!(task.log_path.as_deref(), Some("/var/log/renderq/task.log"));
}
