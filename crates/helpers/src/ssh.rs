// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! SSH/SFTP helper, following the same registry contract as the other
//! session-backed helpers. The actual network/protocol work sits
//! behind a small [`SshBackend`] seam, the same shape as the database
//! helper's `DbDriver` (`crate::db::driver`): one real implementation
//! backed by `ssh2` (synchronous, so it drops straight into this
//! dispatcher's synchronous call path with no async bridging), one
//! `FakeSshBackend` for tests under `test-support`.

use std::io::Read;
use std::net::TcpStream;

use serde_json::{json, Value};

use crate::error::HelperError;
use crate::module::{HelperCtx, HelperModule};
use crate::params::Params;

pub struct SshModule;

impl HelperModule for SshModule {
    fn name(&self) -> &'static str {
        "ssh"
    }

    fn functions(&self) -> &'static [&'static str] {
        &["connect", "exec", "disconnect"]
    }

    fn dispatch(&self, function: &str, params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
        match function {
            "connect" => connect(params, ctx),
            "exec" => exec(params, ctx),
            "disconnect" => disconnect(params, ctx),
            other => Err(HelperError::UnknownFunction(other.to_string())),
        }
    }
}

/// Output of one `exec` call.
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

/// A live, authenticated SSH session.
pub trait SshSession: Send {
    fn exec(&mut self, command: &str) -> Result<ExecOutput, HelperError>;
    fn close(&mut self) -> Result<(), HelperError>;
}

/// Turns connect parameters into a live [`SshSession`].
pub trait SshBackend: Send + Sync {
    fn connect(
        &self,
        host: &str,
        port: u16,
        username: &str,
        password: Option<&str>,
    ) -> Result<Box<dyn SshSession>, HelperError>;
}

struct RealSshBackend;

impl SshBackend for RealSshBackend {
    fn connect(
        &self,
        host: &str,
        port: u16,
        username: &str,
        password: Option<&str>,
    ) -> Result<Box<dyn SshSession>, HelperError> {
        let tcp = TcpStream::connect((host, port))
            .map_err(|e| HelperError::DriverError(format!("connecting to {host}:{port}: {e}")))?;
        let mut session = ssh2::Session::new()
            .map_err(|e| HelperError::DriverError(format!("creating SSH session: {e}")))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| HelperError::DriverError(format!("SSH handshake: {e}")))?;

        match password {
            Some(password) => session
                .userauth_password(username, password)
                .map_err(|e| HelperError::DriverError(format!("password auth failed: {e}")))?,
            None => session
                .userauth_agent(username)
                .map_err(|e| HelperError::DriverError(format!("agent auth failed: {e}")))?,
        }
        if !session.authenticated() {
            return Err(HelperError::DriverError("SSH authentication was not accepted".into()));
        }

        Ok(Box::new(RealSshSession { session }))
    }
}

struct RealSshSession {
    session: ssh2::Session,
}

impl SshSession for RealSshSession {
    fn exec(&mut self, command: &str) -> Result<ExecOutput, HelperError> {
        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| HelperError::DriverError(format!("opening channel: {e}")))?;
        channel.exec(command).map_err(|e| HelperError::DriverError(format!("exec failed: {e}")))?;

        let mut stdout = String::new();
        channel
            .read_to_string(&mut stdout)
            .map_err(|e| HelperError::DriverError(format!("reading stdout: {e}")))?;
        let mut stderr = String::new();
        channel
            .stderr()
            .read_to_string(&mut stderr)
            .map_err(|e| HelperError::DriverError(format!("reading stderr: {e}")))?;

        channel.wait_close().map_err(|e| HelperError::DriverError(format!("closing channel: {e}")))?;
        let exit_status = channel.exit_status().unwrap_or(-1);
        Ok(ExecOutput { stdout, stderr, exit_status })
    }

    fn close(&mut self) -> Result<(), HelperError> {
        let _ = self.session.disconnect(None, "bye", None);
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Canned command -> output pairs, handed out in call order to every
    /// session opened against this backend; once exhausted, `exec`
    /// returns an empty, successful result so tests don't need to
    /// enumerate every call.
    pub struct FakeSshBackend {
        scripted: Arc<Mutex<VecDeque<ExecOutput>>>,
    }

    impl FakeSshBackend {
        pub fn new() -> Self {
            Self { scripted: Arc::new(Mutex::new(VecDeque::new())) }
        }

        pub fn push(&self, stdout: impl Into<String>, exit_status: i32) {
            self.scripted.lock().unwrap().push_back(ExecOutput {
                stdout: stdout.into(),
                stderr: String::new(),
                exit_status,
            });
        }
    }

    impl Default for FakeSshBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SshBackend for FakeSshBackend {
        fn connect(
            &self,
            _host: &str,
            _port: u16,
            _username: &str,
            _password: Option<&str>,
        ) -> Result<Box<dyn SshSession>, HelperError> {
            Ok(Box::new(FakeSshSession { scripted: Arc::clone(&self.scripted) }))
        }
    }

    struct FakeSshSession {
        scripted: Arc<Mutex<VecDeque<ExecOutput>>>,
    }

    impl SshSession for FakeSshSession {
        fn exec(&mut self, _command: &str) -> Result<ExecOutput, HelperError> {
            Ok(self
                .scripted
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| ExecOutput { stdout: String::new(), stderr: String::new(), exit_status: 0 }))
        }

        fn close(&mut self) -> Result<(), HelperError> {
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
fn backend() -> Box<dyn SshBackend> {
    Box::new(fake::FakeSshBackend::new())
}

#[cfg(not(any(test, feature = "test-support")))]
fn backend() -> Box<dyn SshBackend> {
    Box::new(RealSshBackend)
}

struct SessionHandle {
    session: Box<dyn SshSession>,
}

/// Close the SSH session if `payload` is in fact an SSH [`SessionHandle`]
/// -- a no-op otherwise, since `Kind::Session` is shared with the `ftp`
/// and `smtp` helpers and a release hook on that kind must try each
/// possibility. Used both by `disconnect` and the registry's release
/// hook (`full_registry`), so reaper eviction gets the same teardown an
/// explicit `disconnect` call does.
pub(crate) fn release_session(payload: &mut hd_registry::Payload) {
    if let Some(handle) = payload.downcast_mut::<SessionHandle>() {
        if let Err(e) = handle.session.close() {
            tracing::warn!(error = %e, "error closing session during release");
        }
    }
}

fn connect(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let host = params.required_str("host", 0)?;
    let port = params.field("port", 1).and_then(Value::as_u64).unwrap_or(22) as u16;
    let username = params.required_str("username", 2)?;
    let password = params.opt_str("password", 3);

    let session = backend().connect(&host, port, &username, password.as_deref())?;
    let id = ctx.registry.create(
        hd_registry::Kind::Session,
        Box::new(SessionHandle { session }),
        None,
        json!({"protocol": "ssh", "host": host, "port": port, "username": username}),
    );
    Ok(json!({"session_id": id}))
}

fn exec(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let session_id = params.required_str("session_id", 0)?;
    let command = params.required_str("command", 1)?;

    let entry = ctx.registry.get(&session_id, Some(hd_registry::Kind::Session))?;
    entry.with_state(&**ctx.registry.clock(), |state| {
        let handle = state
            .payload
            .downcast_mut::<SessionHandle>()
            .ok_or_else(|| HelperError::Internal("ssh session payload type mismatch".into()))?;
        let out = handle.session.exec(&command)?;
        Ok(json!({"stdout": out.stdout, "stderr": out.stderr, "exit_status": out.exit_status}))
    })
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
#[path = "ssh_tests.rs"]
mod tests;
