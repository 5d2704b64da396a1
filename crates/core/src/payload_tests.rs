// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn default_is_empty() {
    let payload = Payload::default();
    assert!(payload.is_empty());
}

#[test]
fn insert_and_get_roundtrip() {
    let mut payload = Payload::new();
    payload.insert("frame_start", 1);
    payload.insert("project", "/p.aep");
    assert_eq!(payload.get_i64("frame_start"), Some(1));
    assert_eq!(payload.get_str("project"), Some("/p.aep"));
}

#[test]
fn missing_key_returns_none() {
    let payload = Payload::new();
    assert_eq!(payload.get_str("nope"), None);
}

#[test]
fn serde_roundtrip_preserves_shape() {
    let mut payload = Payload::new();
    payload.insert("chunk_size", 25);
    payload.insert("enabled", true);
    let json = serde_json::to_string(&payload).expect("serialize");
    let back: Payload = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.get_i64("chunk_size"), Some(25));
    assert_eq!(back.get_bool("enabled"), Some(true));
}

#[test]
fn from_serde_map() {
    let map = json!({"a": 1, "b": "two"}).as_object().unwrap().clone();
    let payload: Payload = map.into();
    assert_eq!(payload.get_i64("a"), Some(1));
    assert_eq!(payload.get_str("b"), Some("two"));
}
