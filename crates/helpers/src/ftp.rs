// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! FTP helper, following the same registry contract as [`crate::ssh`].
//! The actual wire-level FTP work sits behind a small [`FtpBackend`]
//! seam: `suppaftp`'s synchronous client for the real implementation, a
//! `FakeFtpBackend` for tests under `test-support`.

use std::io::Cursor;

use serde_json::{json, Value};
use suppaftp::FtpStream;

use crate::error::HelperError;
use crate::module::{HelperCtx, HelperModule};
use crate::params::Params;

pub struct FtpModule;

impl HelperModule for FtpModule {
    fn name(&self) -> &'static str {
        "ftp"
    }

    fn functions(&self) -> &'static [&'static str] {
        &["connect", "list", "get", "put", "disconnect"]
    }

    fn dispatch(&self, function: &str, params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
        match function {
            "connect" => connect(params, ctx),
            "list" => list(params, ctx),
            "get" => get(params, ctx),
            "put" => put(params, ctx),
            "disconnect" => disconnect(params, ctx),
            other => Err(HelperError::UnknownFunction(other.to_string())),
        }
    }
}

/// A live, authenticated FTP session.
pub trait FtpSession: Send {
    fn list(&mut self, path: Option<&str>) -> Result<Vec<String>, HelperError>;
    fn get(&mut self, path: &str) -> Result<Vec<u8>, HelperError>;
    fn put(&mut self, path: &str, data: &[u8]) -> Result<(), HelperError>;
    fn close(&mut self) -> Result<(), HelperError>;
}

/// Turns connect parameters into a live [`FtpSession`].
pub trait FtpBackend: Send + Sync {
    fn connect(
        &self,
        host: &str,
        port: u16,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn FtpSession>, HelperError>;
}

struct RealFtpBackend;

impl FtpBackend for RealFtpBackend {
    fn connect(
        &self,
        host: &str,
        port: u16,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn FtpSession>, HelperError> {
        let mut stream = FtpStream::connect((host, port))
            .map_err(|e| HelperError::DriverError(format!("connecting to {host}:{port}: {e}")))?;
        stream
            .login(username, password)
            .map_err(|e| HelperError::DriverError(format!("login failed: {e}")))?;
        Ok(Box::new(RealFtpSession { stream }))
    }
}

struct RealFtpSession {
    stream: FtpStream,
}

impl FtpSession for RealFtpSession {
    fn list(&mut self, path: Option<&str>) -> Result<Vec<String>, HelperError> {
        self.stream.list(path).map_err(|e| HelperError::DriverError(format!("list failed: {e}")))
    }

    fn get(&mut self, path: &str) -> Result<Vec<u8>, HelperError> {
        self.stream
            .retr_as_buffer(path)
            .map(|cursor| cursor.into_inner())
            .map_err(|e| HelperError::DriverError(format!("retrieving {path}: {e}")))
    }

    fn put(&mut self, path: &str, data: &[u8]) -> Result<(), HelperError> {
        let mut reader = Cursor::new(data.to_vec());
        self.stream
            .put_file(path, &mut reader)
            .map(|_| ())
            .map_err(|e| HelperError::DriverError(format!("storing {path}: {e}")))
    }

    fn close(&mut self) -> Result<(), HelperError> {
        let _ = self.stream.quit();
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// An in-memory filesystem standing in for the remote FTP server.
    #[derive(Default)]
    pub struct FakeFtpBackend {
        files: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl FakeFtpBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
            self.files.lock().unwrap().insert(path.into(), contents.into());
        }
    }

    impl FtpBackend for FakeFtpBackend {
        fn connect(
            &self,
            _host: &str,
            _port: u16,
            _username: &str,
            _password: &str,
        ) -> Result<Box<dyn FtpSession>, HelperError> {
            Ok(Box::new(FakeFtpSession { files: self.files.lock().unwrap().clone() }))
        }
    }

    struct FakeFtpSession {
        files: HashMap<String, Vec<u8>>,
    }

    impl FtpSession for FakeFtpSession {
        fn list(&mut self, _path: Option<&str>) -> Result<Vec<String>, HelperError> {
            Ok(self.files.keys().cloned().collect())
        }

        fn get(&mut self, path: &str) -> Result<Vec<u8>, HelperError> {
            self.files.get(path).cloned().ok_or_else(|| HelperError::NotFound(path.to_string()))
        }

        fn put(&mut self, path: &str, data: &[u8]) -> Result<(), HelperError> {
            self.files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn close(&mut self) -> Result<(), HelperError> {
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
fn backend() -> Box<dyn FtpBackend> {
    Box::new(fake::FakeFtpBackend::new())
}

#[cfg(not(any(test, feature = "test-support")))]
fn backend() -> Box<dyn FtpBackend> {
    Box::new(RealFtpBackend)
}

struct SessionHandle {
    session: Box<dyn FtpSession>,
}

/// Close the FTP session if `payload` is in fact an FTP [`SessionHandle`]
/// -- see [`crate::ssh::release_session`] for why `Kind::Session`'s
/// release hook must try every protocol's handle type.
pub(crate) fn release_session(payload: &mut hd_registry::Payload) {
    if let Some(handle) = payload.downcast_mut::<SessionHandle>() {
        if let Err(e) = handle.session.close() {
            tracing::warn!(error = %e, "error closing session during release");
        }
    }
}

fn connect(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let host = params.required_str("host", 0)?;
    let port = params.field("port", 1).and_then(Value::as_u64).unwrap_or(21) as u16;
    let username = params.opt_str("username", 2).unwrap_or_else(|| "anonymous".to_string());
    let password = params.opt_str("password", 3).unwrap_or_default();

    let session = backend().connect(&host, port, &username, &password)?;
    let id = ctx.registry.create(
        hd_registry::Kind::Session,
        Box::new(SessionHandle { session }),
        None,
        json!({"protocol": "ftp", "host": host, "port": port, "username": username}),
    );
    Ok(json!({"session_id": id}))
}

fn with_session<R>(
    session_id: &str,
    ctx: &HelperCtx,
    f: impl FnOnce(&mut dyn FtpSession) -> Result<R, HelperError>,
) -> Result<R, HelperError> {
    let entry = ctx.registry.get(session_id, Some(hd_registry::Kind::Session))?;
    entry.with_state(&**ctx.registry.clock(), |state| {
        let handle = state
            .payload
            .downcast_mut::<SessionHandle>()
            .ok_or_else(|| HelperError::Internal("ftp session payload type mismatch".into()))?;
        f(&mut *handle.session)
    })
}

fn list(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let session_id = params.required_str("session_id", 0)?;
    let path = params.opt_str("path", 1);
    let entries = with_session(&session_id, ctx, |session| session.list(path.as_deref()))?;
    Ok(json!({"entries": entries}))
}

fn get(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let session_id = params.required_str("session_id", 0)?;
    let path = params.required_str("path", 1)?;
    let bytes = with_session(&session_id, ctx, |session| session.get(&path))?;
    Ok(json!({"contents_hex": hex::encode(bytes)}))
}

fn put(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let session_id = params.required_str("session_id", 0)?;
    let path = params.required_str("path", 1)?;
    let contents_hex = params.required_str("contents_hex", 2)?;
    let data = hex::decode(&contents_hex)
        .map_err(|e| HelperError::InvalidParams(format!("contents_hex is not valid hex: {e}")))?;
    with_session(&session_id, ctx, |session| session.put(&path, &data))?;
    Ok(json!({"success": true}))
}

fn disconnect(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let session_id = params.required_str("session_id", 0)?;
    if let Ok(entry) = ctx.registry.get(&session_id, Some(hd_registry::Kind::Session)) {
        entry.with_state(&**ctx.registry.clock(), |state| release_session(&mut state.payload));
    }
    ctx.registry.destroy(&session_id);
    Ok(json!({"success": true}))
}

#[cfg(test)]
#[path = "ftp_tests.rs"]
mod tests;
