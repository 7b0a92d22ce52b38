// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! SMTP helper, following the same registry contract as [`crate::ssh`]
//! and [`crate::ftp`]. The actual mail submission sits behind a small
//! [`SmtpBackend`] seam: `lettre`'s synchronous relay transport for the
//! real implementation, a `FakeSmtpBackend` for tests under
//! `test-support`.

use lettre::message::Message;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use serde_json::{json, Value};

use crate::error::HelperError;
use crate::module::{HelperCtx, HelperModule};
use crate::params::Params;

pub struct SmtpModule;

impl HelperModule for SmtpModule {
    fn name(&self) -> &'static str {
        "smtp"
    }

    fn functions(&self) -> &'static [&'static str] {
        &["connect", "send", "disconnect"]
    }

    fn dispatch(&self, function: &str, params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
        match function {
            "connect" => connect(params, ctx),
            "send" => send(params, ctx),
            "disconnect" => disconnect(params, ctx),
            other => Err(HelperError::UnknownFunction(other.to_string())),
        }
    }
}

pub struct OutgoingMail<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
}

/// A relay session ready to submit messages.
pub trait SmtpSession: Send {
    fn send(&mut self, mail: OutgoingMail<'_>) -> Result<(), HelperError>;
}

/// Turns connect parameters into a live [`SmtpSession`].
pub trait SmtpBackend: Send + Sync {
    fn connect(&self, host: &str, username: Option<&str>, password: Option<&str>) -> Result<Box<dyn SmtpSession>, HelperError>;
}

struct RealSmtpBackend;

impl SmtpBackend for RealSmtpBackend {
    fn connect(&self, host: &str, username: Option<&str>, password: Option<&str>) -> Result<Box<dyn SmtpSession>, HelperError> {
        let mut builder = SmtpTransport::relay(host)
            .map_err(|e| HelperError::DriverError(format!("resolving relay {host}: {e}")))?;
        if let (Some(username), Some(password)) = (username, password) {
            builder = builder.credentials(Credentials::new(username.to_string(), password.to_string()));
        }
        Ok(Box::new(RealSmtpSession { transport: builder.build() }))
    }
}

struct RealSmtpSession {
    transport: SmtpTransport,
}

impl SmtpSession for RealSmtpSession {
    fn send(&mut self, mail: OutgoingMail<'_>) -> Result<(), HelperError> {
        let message = Message::builder()
            .from(mail.from.parse().map_err(|e| HelperError::InvalidParams(format!("invalid from address: {e}")))?)
            .to(mail.to.parse().map_err(|e| HelperError::InvalidParams(format!("invalid to address: {e}")))?)
            .subject(mail.subject)
            .body(mail.body.to_string())
            .map_err(|e| HelperError::InvalidParams(format!("building message: {e}")))?;
        self.transport.send(&message).map_err(|e| HelperError::DriverError(format!("sending mail: {e}")))?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeSmtpBackend {
        pub sent: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeSmtpBackend {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl SmtpBackend for FakeSmtpBackend {
        fn connect(&self, _host: &str, _username: Option<&str>, _password: Option<&str>) -> Result<Box<dyn SmtpSession>, HelperError> {
            Ok(Box::new(FakeSmtpSession))
        }
    }

    struct FakeSmtpSession;

    impl SmtpSession for FakeSmtpSession {
        fn send(&mut self, mail: OutgoingMail<'_>) -> Result<(), HelperError> {
            if mail.to.is_empty() {
                return Err(HelperError::InvalidParams("`to` must not be empty".into()));
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
fn backend() -> Box<dyn SmtpBackend> {
    Box::new(fake::FakeSmtpBackend::new())
}

#[cfg(not(any(test, feature = "test-support")))]
fn backend() -> Box<dyn SmtpBackend> {
    Box::new(RealSmtpBackend)
}

struct SessionHandle {
    session: Box<dyn SmtpSession>,
}

/// `SmtpSession` has no explicit teardown (a `SmtpTransport` holds no
/// persistent connection between sends), so this only needs to
/// recognize the payload for the combined `Kind::Session` release hook
/// -- see [`crate::ssh::release_session`].
pub(crate) fn release_session(payload: &mut hd_registry::Payload) {
    let _ = payload.downcast_mut::<SessionHandle>();
}

fn connect(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let host = params.required_str("host", 0)?;
    let username = params.opt_str("username", 1);
    let password = params.opt_str("password", 2);

    let session = backend().connect(&host, username.as_deref(), password.as_deref())?;
    let id = ctx.registry.create(
        hd_registry::Kind::Session,
        Box::new(SessionHandle { session }),
        None,
        json!({"protocol": "smtp", "host": host}),
    );
    Ok(json!({"session_id": id}))
}

fn send(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let session_id = params.required_str("session_id", 0)?;
    let from = params.required_str("from", 1)?;
    let to = params.required_str("to", 2)?;
    let subject = params.opt_str("subject", 3).unwrap_or_default();
    let body = params.opt_str("body", 4).unwrap_or_default();

    let entry = ctx.registry.get(&session_id, Some(hd_registry::Kind::Session))?;
    entry.with_state(&**ctx.registry.clock(), |state| {
        let handle = state
            .payload
            .downcast_mut::<SessionHandle>()
            .ok_or_else(|| HelperError::Internal("smtp session payload type mismatch".into()))?;
        handle.session.send(OutgoingMail { from: &from, to: &to, subject: &subject, body: &body })
    })?;
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
#[path = "smtp_tests.rs"]
mod tests;
