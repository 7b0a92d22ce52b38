// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! The dispatcher contract every helper module implements.

use std::collections::HashMap;
use std::sync::Arc;

use hd_registry::Registry;
use serde_json::Value;

use crate::error::HelperError;
use crate::health::HealthState;
use crate::params::Params;

/// Shared daemon-wide state every helper dispatch sees.
pub struct HelperCtx {
    pub registry: Arc<Registry>,
    pub health: Arc<HealthState>,
}

/// A registered helper module. Function whitelisting -- only functions
/// explicitly enumerated are callable, regardless of the
/// language-level visibility of other symbols -- is structural here: a
/// module's `dispatch` match only ever recognizes the names in
/// `functions()`, so there is no reflection-based escape hatch.
pub trait HelperModule: Send + Sync {
    fn name(&self) -> &'static str;
    fn functions(&self) -> &'static [&'static str];
    fn dispatch(&self, function: &str, params: Params, ctx: &HelperCtx) -> Result<Value, HelperError>;
}

/// The static `(module, function)` registration table built once at
/// startup.
pub struct Dispatcher {
    modules: HashMap<&'static str, Box<dyn HelperModule>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self { modules: HashMap::new() }
    }

    pub fn register(mut self, module: Box<dyn HelperModule>) -> Self {
        self.modules.insert(module.name(), module);
        self
    }

    pub fn dispatch(
        &self,
        module: &str,
        function: &str,
        params: Value,
        ctx: &HelperCtx,
    ) -> Result<Value, HelperError> {
        let m = self
            .modules
            .get(module)
            .ok_or_else(|| HelperError::UnknownModule(module.to_string()))?;
        if !m.functions().contains(&function) {
            return Err(HelperError::UnknownFunction(format!("{module}.{function}")));
        }
        m.dispatch(function, Params::new(params), ctx)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the full registration table: every built-in helper module.
pub fn full_registry() -> Dispatcher {
    Dispatcher::new()
        .register(Box::new(crate::test_module::TestModule))
        .register(Box::new(crate::db::DbModule::new()))
        .register(Box::new(crate::crypto::CryptoModule))
        .register(Box::new(crate::xpath::XPathModule))
        .register(Box::new(crate::lock::LockModule))
        .register(Box::new(crate::datetime::DatetimeModule))
        .register(Box::new(crate::ssh::SshModule))
        .register(Box::new(crate::ftp::FtpModule))
        .register(Box::new(crate::smtp::SmtpModule))
}

/// Register every helper's native teardown on `registry`, so a cascading
/// `destroy` (e.g. `disconnect` tearing down child statements) or a
/// reaper eviction runs the same release logic an explicit release call
/// does. Call once, alongside `full_registry`, before the registry
/// serves any request.
///
/// `Kind::Cipher` and `Kind::Doc` have no hook: a cipher instance is
/// inert key material and a parsed XML document is plain owned memory,
/// so `destroy` dropping the payload is already the whole release.
pub fn install_release_hooks(registry: &hd_registry::Registry) {
    registry.set_release_hook(hd_registry::Kind::Conn, |entry| {
        entry.with_payload(crate::db::release_connection);
    });
    registry.set_release_hook(hd_registry::Kind::Stmt, |entry| {
        entry.with_payload(crate::db::release_statement);
    });
    registry.set_release_hook(hd_registry::Kind::Session, |entry| {
        entry.with_payload(|payload| {
            crate::ssh::release_session(payload);
            crate::ftp::release_session(payload);
            crate::smtp::release_session(payload);
        });
    });
    registry.set_release_hook(hd_registry::Kind::Lock, |entry| {
        entry.with_payload(crate::lock::release_lock);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoModule;
    impl HelperModule for EchoModule {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn functions(&self) -> &'static [&'static str] {
            &["say"]
        }
        fn dispatch(
            &self,
            function: &str,
            params: Params,
            _ctx: &HelperCtx,
        ) -> Result<Value, HelperError> {
            match function {
                "say" => Ok(params.required("text", 0)?.clone()),
                other => Err(HelperError::UnknownFunction(other.to_string())),
            }
        }
    }

    fn ctx() -> HelperCtx {
        HelperCtx {
            registry: Arc::new(Registry::new(Arc::new(hd_core::SystemClock))),
            health: Arc::new(HealthState::new()),
        }
    }

    #[test]
    fn unknown_module_is_rejected_before_dispatch() {
        let d = Dispatcher::new().register(Box::new(EchoModule));
        let err = d.dispatch("nope", "say", json!({}), &ctx()).unwrap_err();
        assert!(matches!(err, HelperError::UnknownModule(_)));
    }

    #[test]
    fn unknown_function_is_rejected_even_though_module_exists() {
        let d = Dispatcher::new().register(Box::new(EchoModule));
        let err = d.dispatch("echo", "shout", json!({}), &ctx()).unwrap_err();
        assert!(matches!(err, HelperError::UnknownFunction(_)));
    }

    #[test]
    fn known_function_dispatches() {
        let d = Dispatcher::new().register(Box::new(EchoModule));
        let result = d.dispatch("echo", "say", json!({"text": "hi"}), &ctx()).unwrap();
        assert_eq!(result, json!("hi"));
    }
}
