// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process event bus (spec §4.9): pure pub/sub notification of state
//! mutations. Unlike the entity tables in [`renderq_store::Store`], events
//! themselves are never persisted — a subscriber that wasn't listening when
//! an event fired has simply missed it. Durability lives in the Store; this
//! is purely for the `SubscribeEvents` stream and in-process logging hooks.

use renderq_core::Event;
use tokio::sync::broadcast;

/// Depth of the broadcast channel. A slow or absent subscriber can lag up to
/// this many events before its next receive reports `Lagged`.
const CHANNEL_CAPACITY: usize = 1024;

/// Shared handle to the coordinator's event stream. Cloning shares the same
/// underlying channel — every clone publishes to, and every subscriber reads
/// from, the same bus.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish `event` to every current subscriber. Silently drops the event
    /// if nobody is listening — there is always at least the scheduler's own
    /// logging subscriber in practice, but tests often have none.
    pub fn publish(&self, event: Event) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
