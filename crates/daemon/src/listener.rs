// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Connection acceptance and per-request handling: accept in a loop,
//! spawn one task per connection, race the handler against client
//! disconnect so an abandoned connection never wastes a worker slot.

use std::sync::Arc;
use std::time::Duration;

use hd_helpers::{Dispatcher, HelperCtx, HelperError};
use hd_wire::{ProtocolError, Request, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Shared, read-only state every accepted connection sees.
pub struct ListenCtx {
    pub dispatcher: Dispatcher,
    pub helper_ctx: HelperCtx,
    pub max_request_bytes: u32,
    pub request_timeout: Duration,
    /// Required of TCP connections only; Unix-socket connections are
    /// trusted by filesystem permissions alone.
    pub auth_token: Option<String>,
    /// Bounds the number of requests handled concurrently.
    pub workers: Arc<Semaphore>,
}

pub struct Listener {
    unix: UnixListener,
    tcp: Option<TcpListener>,
    ctx: Arc<ListenCtx>,
}

#[derive(Debug, Error)]
enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionSource {
    Unix,
    Tcp,
}

impl Listener {
    pub fn new(unix: UnixListener, tcp: Option<TcpListener>, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, tcp, ctx }
    }

    /// Accept connections until `shutdown` fires. Each connection is
    /// handled in its own spawned task so one slow request never blocks
    /// new connections from being accepted.
    pub async fn run(self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            tokio::select! {
                result = self.unix.accept() => {
                    match result {
                        Ok((stream, _)) => self.spawn_connection(stream, ConnectionSource::Unix),
                        Err(e) => error!(error = %e, "unix accept error"),
                    }
                }
                result = accept_tcp(self.tcp.as_ref()) => {
                    match result {
                        Ok((stream, addr)) => {
                            debug!(%addr, "tcp connection accepted");
                            self.spawn_connection(stream, ConnectionSource::Tcp);
                        }
                        Err(e) => error!(error = %e, "tcp accept error"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("listener shutting down");
                        break;
                    }
                }
            }
        }
    }

    fn spawn_connection<S>(&self, stream: S, source: ConnectionSource)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            let _permit = ctx.workers.acquire().await;
            let (reader, writer) = tokio::io::split(stream);
            if let Err(e) = handle_connection(reader, writer, source, &ctx).await {
                log_connection_error(e);
            }
        });
    }
}

/// Waits on the optional TCP listener. When no TCP listener is
/// configured this never resolves, so the surrounding `select!` simply
/// never picks this branch instead of spinning on a stream of `None`s.
async fn accept_tcp(
    tcp: Option<&TcpListener>,
) -> std::io::Result<(tokio::net::TcpStream, std::net::SocketAddr)> {
    match tcp {
        Some(listener) => listener.accept().await,
        None => std::future::pending().await,
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => debug!("client disconnected"),
        ConnectionError::Protocol(ProtocolError::Timeout) => warn!("connection timed out"),
        ConnectionError::Protocol(e) => warn!(error = %e, "connection protocol error"),
    }
}

/// Handle exactly one request/response pair: read one frame, dispatch,
/// write one frame, close.
async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    source: ConnectionSource,
    ctx: &ListenCtx,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + AsyncReadExt + Unpin + Send,
    W: AsyncWrite + AsyncWriteExt + Unpin + Send,
{
    ctx.helper_ctx.health.connection_opened();
    let result = handle_connection_inner(&mut reader, &mut writer, source, ctx).await;
    ctx.helper_ctx.health.connection_closed();
    result
}

async fn handle_connection_inner<R, W>(
    reader: &mut R,
    writer: &mut W,
    source: ConnectionSource,
    ctx: &ListenCtx,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + AsyncReadExt + Unpin + Send,
    W: AsyncWrite + AsyncWriteExt + Unpin + Send,
{
    let request = match hd_wire::read_request(reader, ctx.max_request_bytes, ctx.request_timeout).await {
        Ok(request) => request,
        Err(e) => {
            // A malformed or oversized frame still gets a `bad_request`
            // response when there was enough of a frame to reply to; a
            // bare disconnect or timeout has no request to answer, so
            // the connection just closes.
            if e.is_bad_request() {
                let response = Response::err(e.to_string(), hd_core::ErrorKind::BadRequest);
                let _ = hd_wire::write_response(writer, &response, ctx.request_timeout).await;
            }
            return Err(e.into());
        }
    };

    if source == ConnectionSource::Tcp {
        if let Some(expected) = &ctx.auth_token {
            let provided = request.params.get("auth_token").and_then(|v| v.as_str());
            if provided != Some(expected.as_str()) {
                let response = Response::err("unauthorized", hd_core::ErrorKind::InvalidParams);
                let _ = hd_wire::write_response(writer, &response, ctx.request_timeout).await;
                return Ok(());
            }
        }
    }

    let is_health_check = request.module == "test";
    if is_health_check {
        debug!(module = %request.module, function = %request.function, "received request");
    } else {
        info!(module = %request.module, function = %request.function, "received request");
    }

    let response = tokio::select! {
        response = dispatch_with_timeout(&request, ctx) => response,
        _ = detect_client_disconnect(reader) => {
            debug!("client disconnected, dropping response");
            return Ok(());
        }
    };

    hd_wire::write_response(writer, &response, ctx.request_timeout).await?;
    Ok(())
}

/// Dispatch `request`, bounding the call by `ctx.request_timeout` so a
/// hanging driver call can't block a worker slot forever. Only the
/// dispatch itself is timed here -- `read_request`/`write_response`
/// each enforce their own deadline already (`hd_wire::codec`).
async fn dispatch_with_timeout(request: &Request, ctx: &ListenCtx) -> Response {
    match tokio::time::timeout(ctx.request_timeout, dispatch(request, ctx)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(module = %request.module, function = %request.function, "dispatch exceeded request timeout");
            ctx.helper_ctx.health.record_request(true);
            Response::err(HelperError::Timeout.to_string(), HelperError::Timeout.kind())
                .with_request_id(request.request_id.clone())
        }
    }
}

async fn dispatch(request: &Request, ctx: &ListenCtx) -> Response {
    let result =
        ctx.dispatcher.dispatch(&request.module, &request.function, request.params.clone(), &ctx.helper_ctx);
    ctx.helper_ctx.health.record_request(result.is_err());
    let response = match result {
        Ok(value) => Response::ok_from(&request.module, &request.function, value),
        Err(e) => Response::err(e.to_string(), e.kind()),
    };
    response.with_request_id(request.request_id.clone())
}

/// Resolve once the peer closes the connection -- used to cancel a
/// still-running handler rather than let the worker block forever on a
/// client that has already gone away.
async fn detect_client_disconnect<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => return,
            Ok(_) => continue,
            Err(_) => return,
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
