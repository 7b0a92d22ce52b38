// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! The shared resource registry.

use std::collections::HashMap;
use std::sync::Arc;

use hd_core::Clock;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

use crate::entry::{Entry, Payload};
use crate::kind::Kind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("resource not found: {0}")]
    NotFound(String),
}

type ReleaseHook = Arc<dyn Fn(&Entry) + Send + Sync>;

/// The registry-level state: the id -> entry map and the parent -> child
/// index. Both live behind one lock (`inner`), held only for the
/// duration of create/lookup/destroy bookkeeping -- never while running
/// a helper's own payload work, which goes through `Entry::with_state`'s
/// separate per-entry lock instead.
struct Inner {
    entries: HashMap<String, Arc<Entry>>,
    children: HashMap<String, Vec<String>>,
    release_hooks: HashMap<Kind, ReleaseHook>,
}

pub struct Registry {
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl Registry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                children: HashMap::new(),
                release_hooks: HashMap::new(),
            }),
        }
    }

    /// Register the kind-specific teardown to run when an entry of this
    /// kind is destroyed (closing a cursor, disconnecting a driver
    /// session, disposing a parsed document, ...). Called by the owning
    /// helper module at startup.
    pub fn set_release_hook(&self, kind: Kind, hook: impl Fn(&Entry) + Send + Sync + 'static) {
        self.inner.lock().release_hooks.insert(kind, Arc::new(hook));
    }

    /// Create a new resource entry and return its opaque id.
    ///
    /// `parent_id`, when given, must already be a live entry; the
    /// caller (a helper) is responsible for having validated that
    /// before calling create, since the registry itself has no notion
    /// of which kinds may parent which.
    pub fn create(
        &self,
        kind: Kind,
        payload: Payload,
        parent_id: Option<String>,
        metadata: Value,
    ) -> String {
        let id = format!("{}{}", kind.prefix(), nanoid::nanoid!(16));
        let entry =
            Arc::new(Entry::new(id.clone(), kind, parent_id.clone(), payload, metadata, &*self.clock));

        let mut inner = self.inner.lock();
        inner.entries.insert(id.clone(), entry);
        if let Some(parent) = parent_id {
            inner.children.entry(parent).or_default().push(id.clone());
        }
        id
    }

    /// Look up a live entry by id, optionally asserting its kind.
    pub fn get(&self, id: &str, expected_kind: Option<Kind>) -> Result<Arc<Entry>, RegistryError> {
        let inner = self.inner.lock();
        let entry = inner.entries.get(id).cloned().ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        if let Some(kind) = expected_kind {
            if entry.kind != kind {
                return Err(RegistryError::NotFound(id.to_string()));
            }
        }
        Ok(entry)
    }

    /// Update `last_used_at` without otherwise touching the payload.
    pub fn touch(&self, id: &str) -> Result<(), RegistryError> {
        let entry = self.get(id, None)?;
        entry.with_state(&*self.clock, |_| {});
        Ok(())
    }

    /// Direct children of `id` (not transitive).
    pub fn children(&self, id: &str) -> Vec<String> {
        self.inner.lock().children.get(id).cloned().unwrap_or_default()
    }

    /// Destroy `id` and, transitively, all of its children, child-first,
    /// running each kind's release hook along the way. Idempotent: a
    /// repeat call on an already-destroyed id is a no-op success.
    pub fn destroy(&self, id: &str) -> Vec<String> {
        let child_ids = self.children(id);
        let mut destroyed = Vec::new();
        for child in &child_ids {
            destroyed.extend(self.destroy(child));
        }

        let (entry, hook) = {
            let mut inner = self.inner.lock();
            let entry = inner.entries.remove(id);
            inner.children.remove(id);
            let hook = entry.as_ref().and_then(|e| inner.release_hooks.get(&e.kind).cloned());
            (entry, hook)
        };

        if let Some(entry) = entry {
            if let Some(hook) = hook {
                hook(&entry);
            }
            destroyed.push(id.to_string());
        }
        destroyed
    }

    /// Count of live entries per kind, for the `health` RPC.
    pub fn stats(&self) -> HashMap<Kind, u64> {
        let inner = self.inner.lock();
        let mut counts: HashMap<Kind, u64> = Kind::ALL.iter().map(|k| (*k, 0)).collect();
        for entry in inner.entries.values() {
            *counts.entry(entry.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Snapshot of all live entries, used by the reaper sweep.
    pub fn all_entries(&self) -> Vec<Arc<Entry>> {
        self.inner.lock().entries.values().cloned().collect()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
