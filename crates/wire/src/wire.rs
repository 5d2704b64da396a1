// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::response::EventEnvelope;
use crate::{Request, Response};

/// Largest payload a peer will accept, guarding against a malformed or
/// hostile length prefix forcing an unbounded allocation.
pub const MAX_MESSAGE_BYTES: u32 = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message of {actual} bytes exceeds the {max}-byte limit")]
    TooLarge { max: u32, actual: u32 },
}

/// Serialize `value` to JSON, with no length prefix.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write a 4-byte big-endian length prefix followed by `payload`.
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError> {
    let len = payload.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed message, rejecting prefixes over
/// [`MAX_MESSAGE_BYTES`] before allocating the buffer.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::TooLarge { max: MAX_MESSAGE_BYTES, actual: len });
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

pub async fn write_request<W: AsyncWrite + Unpin>(writer: &mut W, request: &Request) -> Result<(), ProtocolError> {
    write_message(writer, &encode(request)?).await
}

pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Request, ProtocolError> {
    decode(&read_message(reader).await?)
}

pub async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> Result<(), ProtocolError> {
    write_message(writer, &encode(response)?).await
}

pub async fn read_response<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Response, ProtocolError> {
    decode(&read_message(reader).await?)
}

/// Push one frame of an upgraded [`Request::SubscribeEvents`] connection.
pub async fn write_event<W: AsyncWrite + Unpin>(writer: &mut W, envelope: &EventEnvelope) -> Result<(), ProtocolError> {
    write_message(writer, &encode(envelope)?).await
}

pub async fn read_event<R: AsyncRead + Unpin>(reader: &mut R) -> Result<EventEnvelope, ProtocolError> {
    decode(&read_message(reader).await?)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
