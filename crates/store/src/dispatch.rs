// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure candidate selection for the dispatcher (spec §4.3). Separated from
//! [`crate::Store::next_task_for_worker`] so the ordering rule can be
//! exercised without needing a mutable transaction.

use renderq_core::{Job, JobStatus, Task, TaskId, TaskStatus, Worker};

use crate::state::MaterializedState;

/// Select the next Task to hand to `worker`, or `None` if nothing is
/// eligible. Does not mutate anything — callers perform the atomic
/// assignment themselves.
pub fn select_candidate(state: &MaterializedState, worker: &Worker) -> Option<TaskId> {
    let mut candidates: Vec<(&Job, &Task)> = state
        .tasks
        .values()
        .filter(|task| task.status == TaskStatus::Pending)
        .filter_map(|task| state.get_job(&task.job_id).map(|job| (job, task)))
        .filter(|(job, task)| is_eligible(state, job, task, worker))
        .collect();

    candidates.sort_by(|(job_a, task_a), (job_b, task_b)| {
        job_b
            .priority
            .cmp(&job_a.priority)
            .then(job_a.submitted_at.cmp(&job_b.submitted_at))
            .then(task_a.index.cmp(&task_b.index))
    });

    candidates.first().map(|(_, task)| task.id)
}

fn is_eligible(state: &MaterializedState, job: &Job, _task: &Task, worker: &Worker) -> bool {
    if !matches!(job.status, JobStatus::Queued | JobStatus::Active) {
        return false;
    }
    if !worker.can_serve(&job.pool, &job.plugin) {
        return false;
    }
    job.is_eligible_dependencies_met(|dep_id| {
        state.get_job(dep_id).map(|j| j.status == JobStatus::Completed).unwrap_or(false)
    })
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
