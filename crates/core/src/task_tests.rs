// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn job_id() -> JobId {
    JobId::new()
}

#[test]
fn new_task_starts_pending() {
    let task = Task::new(job_id(), 0, Some(1), Some(10), Payload::new()).unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.assigned_worker.is_none());
}

#[test]
fn new_task_rejects_inverted_frame_range() {
    let result = Task::new(job_id(), 0, Some(10), Some(1), Payload::new());
    assert!(matches!(result, Err(CoreError::InvalidFrameRange { start: 10, end: 1 })));
}

#[test]
fn assign_then_start_then_complete() {
    let mut task = Task::builder(job_id()).build();
    let worker = WorkerId::new();

    task.assign(worker).unwrap();
    assert_eq!(task.status, TaskStatus::Assigned);
    assert_eq!(task.assigned_worker, Some(worker));

    task.start(100).unwrap();
    assert_eq!(task.status, TaskStatus::Running);
    assert_eq!(task.started_at, Some(100));

    task.complete(0, 200).unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.exit_code, Some(0));
    assert_eq!(task.progress, 100.0);
}

#[test]
fn running_task_can_fail() {
    let mut task = Task::builder(job_id()).build();
    task.assign(WorkerId::new()).unwrap();
    task.start(0).unwrap();
    task.fail(Some(1), "non-zero exit", 10).unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.exit_code, Some(1));
    assert_eq!(task.error_message.as_deref(), Some("non-zero exit"));
}

#[test]
fn failed_task_retries_to_pending() {
    let mut task = Task::builder(job_id()).build();
    task.assign(WorkerId::new()).unwrap();
    task.start(0).unwrap();
    task.fail(Some(1), "oops", 1).unwrap();

    task.reset_to_pending().unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.assigned_worker.is_none());
    assert!(task.error_message.is_none());
}

#[test]
fn timeout_resets_running_task_without_going_through_failed() {
    // Worker timeout sweep (spec §4.4a) resets `running` directly to
    // `pending`, it does not pass through `failed`.
    let mut task = Task::builder(job_id()).build();
    task.assign(WorkerId::new()).unwrap();
    task.start(0).unwrap();
    task.reset_to_pending().unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
}

#[parameterized(
    pending_to_running = { TaskStatus::Pending, TaskStatus::Running },
    assigned_to_completed = { TaskStatus::Assigned, TaskStatus::Completed },
    completed_to_pending = { TaskStatus::Completed, TaskStatus::Pending },
)]
fn illegal_transitions_are_rejected(from: TaskStatus, to: TaskStatus) {
    assert!(!from.can_transition_to(to));
}

#[test]
fn is_held_true_only_while_assigned_or_running() {
    assert!(!TaskStatus::Pending.is_held());
    assert!(TaskStatus::Assigned.is_held());
    assert!(TaskStatus::Running.is_held());
    assert!(!TaskStatus::Completed.is_held());
    assert!(!TaskStatus::Failed.is_held());
}

#[test]
fn progress_is_clamped_to_0_100() {
    let mut task = Task::builder(job_id()).build();
    task.set_progress(-5.0);
    assert_eq!(task.progress, 0.0);
    task.set_progress(150.0);
    assert_eq!(task.progress, 100.0);
}
