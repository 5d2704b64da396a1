// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-request-per-connection client for talking to `renderq-coordinatord`
//! over TCP or a Unix-domain socket (SPEC_FULL §4).

use std::path::PathBuf;

use anyhow::{Context, Result};
use renderq_wire::{Request, Response};
use tokio::net::{TcpStream, UnixStream};

/// Where the coordinator is listening. Exactly one of `--socket`/`--host`
/// wins — `Endpoint::from_args` resolves precedence.
#[derive(Debug, Clone)]
pub enum Endpoint {
    Tcp(String),
    Unix(PathBuf),
}

impl Endpoint {
    pub fn from_args(host: &str, socket: &Option<PathBuf>) -> Self {
        match socket {
            Some(path) => Self::Unix(path.clone()),
            None => Self::Tcp(host.to_string()),
        }
    }
}

pub struct CoordinatorClient {
    endpoint: Endpoint,
}

impl CoordinatorClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    /// Open a fresh connection, send `request`, and return the single reply.
    /// The coordinator closes the connection once it has written a response
    /// (spec §4.9) — a new `send` call opens a new connection.
    pub async fn send(&self, request: Request) -> Result<Response> {
        match &self.endpoint {
            Endpoint::Tcp(addr) => {
                let stream = TcpStream::connect(addr).await.with_context(|| format!("connecting to {addr}"))?;
                let (mut reader, mut writer) = stream.into_split();
                renderq_wire::write_request(&mut writer, &request).await.context("writing request")?;
                renderq_wire::read_response(&mut reader).await.context("reading response")
            }
            Endpoint::Unix(path) => {
                let stream = UnixStream::connect(path).await.with_context(|| format!("connecting to {}", path.display()))?;
                let (mut reader, mut writer) = stream.into_split();
                renderq_wire::write_request(&mut writer, &request).await.context("writing request")?;
                renderq_wire::read_response(&mut reader).await.context("reading response")
            }
        }
    }

    /// Send `request` and fail loudly if the coordinator replied with
    /// `Response::Error`, surfacing its message as the error context.
    pub async fn send_checked(&self, request: Request) -> Result<Response> {
        match self.send(request).await? {
            Response::Error { message } => Err(anyhow::anyhow!(message)),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
