// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod job;
pub mod plugin;
pub mod stats;
pub mod worker;

use renderq_core::Payload;
use serde_json::Value;

use crate::exit_error::ExitError;

/// Parse `KEY=VALUE` pairs into a [`Payload`], used by `--data`/`--meta`
/// flags. The value is parsed as JSON when possible (`5`, `true`,
/// `"quoted"`) and otherwise kept as a plain string, so `--data frames=10`
/// and `--data 'frames="10"'` both work.
pub fn parse_payload(pairs: &[String]) -> Result<Payload, ExitError> {
    let mut payload = Payload::new();
    for pair in pairs {
        let (key, raw) = pair.split_once('=').ok_or_else(|| ExitError::new(2, format!("invalid --data/--meta entry (expected KEY=VALUE): {pair}")))?;
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        payload.insert(key.to_string(), value);
    }
    Ok(payload)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
