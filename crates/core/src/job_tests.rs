// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn new_job_starts_pending() {
    let job = Job::new("render", "aftereffects", 50, "default", Payload::new(), vec![], Payload::new(), 1000)
        .expect("valid job");
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.progress, 0.0);
    assert_eq!(job.counts, JobCounts::default());
}

#[parameterized(
    too_low = { -1 },
    too_high = { 101 },
)]
fn new_job_rejects_out_of_range_priority(priority: i32) {
    let result = Job::new("render", "aftereffects", priority, "default", Payload::new(), vec![], Payload::new(), 0);
    assert!(matches!(result, Err(CoreError::PriorityOutOfRange(_))));
}

#[parameterized(
    zero = { 0 },
    hundred = { 100 },
)]
fn new_job_accepts_boundary_priority(priority: i32) {
    let result = Job::new("render", "aftereffects", priority, "default", Payload::new(), vec![], Payload::new(), 0);
    assert!(result.is_ok());
}

#[test]
fn pending_to_queued_then_active_stamps_started_at() {
    let mut job = Job::builder().build();
    job.transition_to(JobStatus::Queued, 10).unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert!(job.started_at.is_none());

    job.transition_to(JobStatus::Active, 20).unwrap();
    assert_eq!(job.status, JobStatus::Active);
    assert_eq!(job.started_at, Some(20));
}

#[test]
fn active_to_completed_stamps_finished_at() {
    let mut job = Job::builder().build();
    job.transition_to(JobStatus::Queued, 0).unwrap();
    job.transition_to(JobStatus::Active, 1).unwrap();
    job.transition_to(JobStatus::Completed, 99).unwrap();
    assert_eq!(job.finished_at, Some(99));
}

#[test]
fn illegal_transition_is_rejected() {
    let mut job = Job::builder().build();
    let result = job.transition_to(JobStatus::Completed, 0);
    assert!(matches!(result, Err(CoreError::IllegalJobTransition { .. })));
    assert_eq!(job.status, JobStatus::Pending);
}

#[test]
fn retry_after_fail_resets_progress_and_error() {
    let mut job = Job::builder().build();
    job.transition_to(JobStatus::Queued, 0).unwrap();
    job.transition_to(JobStatus::Active, 1).unwrap();
    job.progress = 42.0;
    job.error_message = Some("boom".into());
    job.transition_to(JobStatus::Failed, 5).unwrap();

    job.transition_to(JobStatus::Queued, 10).unwrap();
    assert_eq!(job.progress, 0.0);
    assert!(job.error_message.is_none());
    assert!(job.finished_at.is_none());
}

#[test]
fn suspended_active_always_returns_via_queued() {
    // Open Question resolution (spec §9): suspended -> active always goes
    // through queued, never directly.
    let mut job = Job::builder().build();
    job.transition_to(JobStatus::Queued, 0).unwrap();
    job.transition_to(JobStatus::Suspended, 1).unwrap();
    assert!(job.transition_to(JobStatus::Active, 2).is_err());
    job.transition_to(JobStatus::Queued, 2).unwrap();
    job.transition_to(JobStatus::Active, 3).unwrap();
    assert_eq!(job.status, JobStatus::Active);
}

#[test]
fn cancellation_reachable_from_any_nonterminal_state() {
    for start in [JobStatus::Pending, JobStatus::Queued, JobStatus::Active, JobStatus::Suspended] {
        let mut job = Job::builder().build();
        match start {
            JobStatus::Queued => job.transition_to(JobStatus::Queued, 0).unwrap(),
            JobStatus::Active => {
                job.transition_to(JobStatus::Queued, 0).unwrap();
                job.transition_to(JobStatus::Active, 0).unwrap();
            }
            JobStatus::Suspended => {
                job.transition_to(JobStatus::Queued, 0).unwrap();
                job.transition_to(JobStatus::Suspended, 0).unwrap();
            }
            _ => {}
        }
        job.transition_to(JobStatus::Cancelled, 1).unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(job.status.is_terminal());
    }
}

#[test]
fn set_priority_validates_range() {
    let mut job = Job::builder().build();
    assert!(job.set_priority(101).is_err());
    assert!(job.set_priority(0).is_ok());
    assert_eq!(job.priority, 0);
}

#[test]
fn dependencies_met_when_all_referenced_jobs_completed() {
    let dep = JobId::new();
    let job = Job::builder().dependent_on(vec![dep]).build();
    assert!(!job.is_eligible_dependencies_met(|_| false));
    assert!(job.is_eligible_dependencies_met(|id| *id == dep));
}

#[test]
fn empty_dependent_on_is_always_eligible() {
    let job = Job::builder().build();
    assert!(job.is_eligible_dependencies_met(|_| false));
}

#[test]
fn job_id_serde_roundtrip() {
    let id = JobId::new();
    let json = serde_json::to_string(&id).unwrap();
    let back: JobId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, back);
}
