// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use renderq_core::{Event, JobId, WorkerId};
use serde::{Deserialize, Serialize};

use crate::types::{JobDetail, JobSummary, PluginSummary, StatsSnapshot, TaskDetail, WorkerSummary};

/// Every response the coordinator may send back over the wire.
///
/// `SubscribeEvents` upgrades a connection (spec §4.9, SPEC_FULL §4): once a
/// client receives `Response::Subscribed`, every subsequent message on that
/// connection is an `EventEnvelope` pushed by the broadcaster rather than a
/// reply to a new request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Pong,
    Hello { version: String },

    Error { message: String },

    Job { job: Box<JobDetail> },
    Jobs { jobs: Vec<JobSummary> },
    JobDeleted { id: JobId },

    Task { task: Box<TaskDetail> },
    Tasks { tasks: Vec<TaskDetail> },
    /// Reply to `PullTask` when nothing was eligible for the worker.
    NoTask,

    Worker { worker: Box<WorkerSummary> },
    Workers { workers: Vec<WorkerSummary> },
    WorkerDeleted { id: WorkerId },

    Plugins { plugins: Vec<PluginSummary> },
    Stats { stats: StatsSnapshot },

    /// Acknowledges `SubscribeEvents`; the connection becomes a one-way
    /// stream of [`EventEnvelope`] frames from here on (SPEC_FULL §4).
    Subscribed,
}

/// One frame of the event stream (spec §4.9, §6 "Event stream").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub data: Event,
    pub timestamp: u64,
}

impl From<Event> for EventEnvelope {
    fn from(event: Event) -> Self {
        Self { event_type: event.type_name(), timestamp: event.timestamp(), data: event }
    }
}

/// A minimal taxonomy for mapping [`Response::Error`] back to a conventional
/// HTTP-ish status for non-wire front-ends (spec §7). The wire protocol
/// itself carries only the message; this is a convenience for adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownPlugin,
    ValidationFailed,
    PartitionFailed,
    NotFound,
    IllegalTransition,
    StoreError,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            Self::UnknownPlugin | Self::ValidationFailed | Self::IllegalTransition => 400,
            Self::NotFound => 404,
            Self::PartitionFailed | Self::StoreError => 500,
        }
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
