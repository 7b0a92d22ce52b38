// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Length-delimited JSON framing.
//!
//! Wire format: 4-byte length prefix (big-endian) + UTF-8 JSON payload.
//! A fixed-size prefix makes "oversized frame" rejection cheap -- the
//! length is known before any payload bytes are read.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::{Request, Response};

/// Default maximum request size: 64 KiB.
pub const DEFAULT_MAX_REQUEST_BYTES: u32 = 64 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed before a full frame was read")]
    ConnectionClosed,

    #[error("request exceeded maximum size of {limit} bytes (got {got})")]
    FrameTooLarge { limit: u32, got: u32 },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request timed out")]
    Timeout,
}

impl ProtocolError {
    /// Whether this layer-level failure maps to `bad_request`: malformed
    /// JSON and oversized frames produce one when possible. I/O errors
    /// and disconnects have no well-formed request to blame, so they
    /// carry no `error_kind` at all -- the socket is simply closed.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, ProtocolError::FrameTooLarge { .. } | ProtocolError::Json(_))
    }
}

/// Read one length-prefixed frame, enforcing `max_bytes`.
pub async fn read_message<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_bytes: u32,
) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(ProtocolError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > max_bytes {
        return Err(ProtocolError::FrameTooLarge { limit: max_bytes, got: len });
    }

    let mut payload = vec![0u8; len as usize];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|_| ProtocolError::ConnectionClosed)?;
    Ok(payload)
}

/// Write one length-prefixed frame.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), ProtocolError> {
    let len = u32::try_from(payload.len())
        .map_err(|_| ProtocolError::FrameTooLarge { limit: u32::MAX, got: u32::MAX })?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Encode a response to raw JSON bytes (no length prefix).
pub fn encode(response: &Response) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(response)?)
}

/// Decode a request from raw JSON bytes.
pub fn decode(bytes: &[u8]) -> Result<Request, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read one request frame within `deadline`, with the oversized-frame
/// check applied against `max_bytes`.
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_bytes: u32,
    deadline: Duration,
) -> Result<Request, ProtocolError> {
    let bytes = timeout(deadline, read_message(reader, max_bytes))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

/// Write one response frame within `deadline`.
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    deadline: Duration,
) -> Result<(), ProtocolError> {
    let bytes = encode(response)?;
    timeout(deadline, write_message(writer, &bytes)).await.map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
