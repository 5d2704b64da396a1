// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `SubscribeEvents` upgrade path (spec §4.9, SPEC_FULL §4): once a
//! connection sends `Request::SubscribeEvents` and receives back
//! `Response::Subscribed`, it becomes a one-way stream of [`EventEnvelope`]
//! frames pushed by this module, until the peer disconnects. A `Ping` from
//! the subscriber is still answered with `Pong` without interrupting the
//! stream (SPEC_FULL §4 "keepalive pings"); any other request on a
//! subscribed connection is ignored.

use renderq_wire::{EventEnvelope, Request, Response};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::events::EventBus;

pub async fn stream_events<R, W>(bus: &EventBus, mut reader: R, mut writer: W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut rx = bus.subscribe();
    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let envelope: EventEnvelope = event.into();
                        if let Err(e) = renderq_wire::write_event(&mut writer, &envelope).await {
                            info!(error = %e, "event subscriber disconnected");
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event subscriber lagged, resuming from the next event");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
            request = renderq_wire::read_request(&mut reader) => {
                match request {
                    Ok(Request::Ping) => {
                        if renderq_wire::write_response(&mut writer, &Response::Pong).await.is_err() {
                            return;
                        }
                    }
                    Ok(_) => {
                        // a subscribed connection is one-way except for keepalives.
                    }
                    Err(_) => return,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "broadcaster_tests.rs"]
mod tests;
