// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator configuration: defaults, overridden by `renderq.toml`,
//! overridden in turn by `RENDERQ_*` environment variables, overridden in
//! turn by CLI flags.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CoordinatorError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub unix_socket: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    pub tick_interval_ms: Option<u64>,
    pub worker_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: Option<String>,
    pub file: Option<String>,
}

/// Raw shape of `renderq.toml`. Every field is optional so a partial file is
/// legal — anything left unset falls back through env then default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    server: ServerSection,
    store: StoreSection,
    scheduler: SchedulerSection,
    log: LogSection,
}

/// Fully resolved coordinator configuration (SPEC_FULL §3).
#[derive(Debug, Clone)]
pub struct RenderqConfig {
    pub bind: String,
    pub unix_socket: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub tick_interval_ms: u64,
    pub worker_timeout_secs: u64,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

/// Flag-level overrides, as parsed by `clap` in `src/bin/main.rs`. Each field
/// is `Some` only when the user passed the corresponding flag.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub unix_socket: Option<String>,
    pub data_dir: Option<String>,
    pub tick_interval_ms: Option<u64>,
    pub worker_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

const DEFAULT_BIND: &str = "0.0.0.0:7420";
const DEFAULT_UNIX_SOCKET: &str = ".renderq/control.sock";
const DEFAULT_DATA_DIR: &str = ".renderq/data";
const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
const DEFAULT_WORKER_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LOG_LEVEL: &str = "info";

impl RenderqConfig {
    /// Load configuration at `config_path > env > toml file > built-in
    /// default` precedence (SPEC_FULL §3). `config_path` is absent when the
    /// caller didn't pass `--config` and no `renderq.toml` exists.
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, CoordinatorError> {
        let raw = match config_path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| CoordinatorError::Config(format!("reading {}: {e}", path.display())))?;
                toml::from_str(&text).map_err(|e| CoordinatorError::Config(format!("parsing {}: {e}", path.display())))?
            }
            None => {
                let default_path = Path::new("renderq.toml");
                if default_path.exists() {
                    let text = std::fs::read_to_string(default_path)
                        .map_err(|e| CoordinatorError::Config(format!("reading renderq.toml: {e}")))?;
                    toml::from_str(&text).map_err(|e| CoordinatorError::Config(format!("parsing renderq.toml: {e}")))?
                } else {
                    RawConfig::default()
                }
            }
        };

        let bind = pick_string(overrides.bind.clone(), env_var("BIND"), raw.server.bind, DEFAULT_BIND);
        let unix_socket = pick_string(overrides.unix_socket.clone(), env_var("UNIX_SOCKET"), raw.server.unix_socket, DEFAULT_UNIX_SOCKET);
        let data_dir = pick_string(overrides.data_dir.clone(), env_var("DATA_DIR"), raw.store.data_dir, DEFAULT_DATA_DIR);
        let log_level = pick_string(overrides.log_level.clone(), std::env::var("RENDERQ_LOG").ok(), raw.log.level, DEFAULT_LOG_LEVEL);

        let tick_interval_ms = pick_u64(
            overrides.tick_interval_ms,
            env_var("TICK_INTERVAL_MS"),
            raw.scheduler.tick_interval_ms,
            DEFAULT_TICK_INTERVAL_MS,
        )?;
        let worker_timeout_secs = pick_u64(
            overrides.worker_timeout_secs,
            env_var("WORKER_TIMEOUT_SECS"),
            raw.scheduler.worker_timeout_secs,
            DEFAULT_WORKER_TIMEOUT_SECS,
        )?;

        let log_file = pick_optional_string(overrides.log_file.clone(), env_var("LOG_FILE"), raw.log.file);

        Ok(Self {
            bind,
            unix_socket: non_empty(unix_socket).map(PathBuf::from),
            data_dir: PathBuf::from(data_dir),
            tick_interval_ms,
            worker_timeout_secs,
            log_level,
            log_file: log_file.map(PathBuf::from),
        })
    }
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("RENDERQ_{suffix}")).ok()
}

fn pick_string(flag: Option<String>, env: Option<String>, file: Option<String>, default: &str) -> String {
    flag.or(env).or(file).unwrap_or_else(|| default.to_string())
}

fn pick_optional_string(flag: Option<String>, env: Option<String>, file: Option<String>) -> Option<String> {
    non_empty(flag.or(env).or(file).unwrap_or_default())
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn pick_u64(flag: Option<u64>, env: Option<String>, file: Option<u64>, default: u64) -> Result<u64, CoordinatorError> {
    if let Some(v) = flag {
        return Ok(v);
    }
    if let Some(v) = env {
        return v.parse().map_err(|_| CoordinatorError::Config(format!("invalid integer: {v}")));
    }
    Ok(file.unwrap_or(default))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
