// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! renderq-coordinator: the control plane (spec §4). Owns the durable
//! [`renderq_store::Store`], the plugin [`renderq_plugins::PluginRegistry`],
//! the in-process [`events::EventBus`], the scheduler tick, and the socket
//! listener that exposes all of it over the wire protocol.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod broadcaster;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod listener;
pub mod scheduler;
pub mod submission;
pub mod worker_protocol;

pub use config::{ConfigOverrides, RenderqConfig};
pub use error::CoordinatorError;
pub use events::EventBus;
pub use listener::{CoordinatorCtx, Listener};
pub use scheduler::TickSummary;
