// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Advisory file-locking helper, backed by OS file locks via `fs2` so
//! two daemon-fronted processes contend on the same lock a legacy
//! caller would reach for on disk.

use std::fs::{File, OpenOptions};

use fs2::FileExt;
use serde_json::{json, Value};

use crate::error::HelperError;
use crate::module::{HelperCtx, HelperModule};
use crate::params::Params;

pub struct LockModule;

impl HelperModule for LockModule {
    fn name(&self) -> &'static str {
        "lock"
    }

    fn functions(&self) -> &'static [&'static str] {
        &["make", "release"]
    }

    fn dispatch(&self, function: &str, params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
        match function {
            "make" => make(params, ctx),
            "release" => release(params, ctx),
            other => Err(HelperError::UnknownFunction(other.to_string())),
        }
    }
}

struct LockHandle {
    file: File,
}

/// Release the OS advisory lock if `payload` is a [`LockHandle`]. Used
/// both by the `release` RPC and the registry's release hook, so a lock
/// the reaper evicts for idleness is actually unlocked rather than
/// merely forgotten (the fd would still release it on drop, but an
/// explicit unlock matches every other kind's teardown).
pub(crate) fn release_lock(payload: &mut hd_registry::Payload) {
    if let Some(handle) = payload.downcast_ref::<LockHandle>() {
        if let Err(e) = handle.file.unlock() {
            tracing::warn!(error = %e, "error unlocking file during release");
        }
    }
}

fn make(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let path = params.required_str("path", 0)?;
    let blocking = params.opt_bool("blocking", 1, false);

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .open(&path)
        .map_err(|e| HelperError::DriverError(format!("opening {path}: {e}")))?;

    if blocking {
        file.lock_exclusive().map_err(|e| HelperError::DriverError(format!("locking {path}: {e}")))?;
    } else {
        file.try_lock_exclusive()
            .map_err(|e| HelperError::StateError(format!("{path} is already locked: {e}")))?;
    }

    let id = ctx.registry.create(hd_registry::Kind::Lock, Box::new(LockHandle { file }), None, json!({"path": path}));
    Ok(json!({"lock_id": id}))
}

fn release(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let lock_id = params.required_str("lock_id", 0)?;
    if let Ok(entry) = ctx.registry.get(&lock_id, Some(hd_registry::Kind::Lock)) {
        entry.with_state(&**ctx.registry.clock(), |state| release_lock(&mut state.payload));
    }
    ctx.registry.destroy(&lock_id);
    Ok(json!({"success": true}))
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
