// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use renderq_core::{Event, JobId};

#[test]
fn ok_serializes_with_bare_type_tag() {
    let json = serde_json::to_string(&Response::Ok).expect("serialize failed");
    assert_eq!(json, r#"{"type":"Ok"}"#);
}

#[test]
fn error_roundtrips() {
    let response = Response::Error { message: "no such plugin: foo".into() };
    let json = serde_json::to_string(&response).expect("serialize failed");
    let back: Response = serde_json::from_str(&json).expect("deserialize failed");
    assert_eq!(back, response);
}

#[test]
fn no_task_has_no_payload_fields() {
    let json = serde_json::to_value(&Response::NoTask).expect("serialize failed");
    assert_eq!(json, serde_json::json!({"type": "NoTask"}));
}

#[test]
fn event_envelope_carries_dotted_type_name_and_timestamp() {
    let job_id = JobId::new();
    let event = Event::JobCompleted { job_id, timestamp: 42 };
    let envelope: EventEnvelope = event.into();

    assert_eq!(envelope.event_type, "job.completed");
    assert_eq!(envelope.timestamp, 42);

    let json = serde_json::to_value(&envelope).expect("serialize failed");
    assert_eq!(json["type"], "job.completed");
}

#[test]
fn error_kind_status_codes_follow_rest_conventions() {
    assert_eq!(ErrorKind::NotFound.status_code(), 404);
    assert_eq!(ErrorKind::ValidationFailed.status_code(), 400);
    assert_eq!(ErrorKind::StoreError.status_code(), 500);
}
