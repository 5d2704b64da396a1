// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use renderq_core::JobId;

#[test]
fn subscriber_receives_published_event() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let event = Event::JobSubmitted { job_id: JobId::new(), timestamp: 1 };
    bus.publish(event.clone());
    assert_eq!(rx.try_recv().unwrap(), event);
}

#[test]
fn publish_with_no_subscribers_does_not_panic() {
    let bus = EventBus::new();
    bus.publish(Event::JobSubmitted { job_id: JobId::new(), timestamp: 1 });
}

#[test]
fn cloned_bus_shares_the_same_channel() {
    let bus = EventBus::new();
    let clone = bus.clone();
    let mut rx = bus.subscribe();
    clone.publish(Event::JobSubmitted { job_id: JobId::new(), timestamp: 1 });
    assert!(rx.try_recv().is_ok());
}
