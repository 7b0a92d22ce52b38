// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! A single resource entry: id, kind, parentage, and the locked payload.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use hd_core::{unix_seconds, Clock};
use parking_lot::Mutex;
use serde_json::Value;

use crate::kind::Kind;

/// Any native handle a helper wants the registry to hold on to: a driver
/// connection, an open cursor, a cipher context, a parsed XML document...
/// The registry never inspects the payload; only the owning helper
/// downcasts it back to its concrete type.
pub type Payload = Box<dyn Any + Send>;

/// The mutable part of an entry, covered by the per-entry lock. Grouping
/// payload and metadata under one lock means every operation that reads
/// or mutates the resource payload also sees a consistent metadata
/// snapshot.
pub struct EntryState {
    pub payload: Payload,
    pub metadata: Value,
}

/// A long-lived helper-owned resource, addressed across the wire by
/// `id` alone.
pub struct Entry {
    pub id: String,
    pub kind: Kind,
    pub parent_id: Option<String>,
    pub created_at: SystemTime,
    last_used_at: AtomicU64,
    state: Mutex<EntryState>,
}

impl Entry {
    pub(crate) fn new(
        id: String,
        kind: Kind,
        parent_id: Option<String>,
        payload: Payload,
        metadata: Value,
        clock: &dyn Clock,
    ) -> Self {
        let now = clock.now();
        Self {
            id,
            kind,
            parent_id,
            created_at: now,
            last_used_at: AtomicU64::new(unix_seconds(now)),
            state: Mutex::new(EntryState { payload, metadata }),
        }
    }

    pub fn last_used_at(&self) -> u64 {
        self.last_used_at.load(Ordering::Relaxed)
    }

    fn mark_used(&self, clock: &dyn Clock) {
        self.last_used_at.store(unix_seconds(clock.now()), Ordering::Relaxed);
    }

    /// Run `f` against the locked payload/metadata, serializing against
    /// any other operation on this same entry, and bump `last_used_at`.
    ///
    /// This is the single choke point every helper operation on a
    /// resource goes through, which gives serialization per resource for
    /// free: two concurrent callers contend on `state`, and whichever
    /// wins runs its closure to completion before the other is admitted.
    pub fn with_state<R>(&self, clock: &dyn Clock, f: impl FnOnce(&mut EntryState) -> R) -> R {
        let mut guard = self.state.lock();
        let result = f(&mut guard);
        drop(guard);
        self.mark_used(clock);
        result
    }

    /// Read-only access to metadata without bumping `last_used_at` --
    /// used by `stats()`/health reporting, which should not itself keep
    /// idle resources alive.
    pub fn metadata_snapshot(&self) -> Value {
        self.state.lock().metadata.clone()
    }

    /// Access the payload for release-hook teardown. No clock is
    /// available to a release hook (the entry is already on its way out
    /// of the registry), so this skips the `last_used_at` bump
    /// `with_state` does.
    pub fn with_payload<R>(&self, f: impl FnOnce(&mut Payload) -> R) -> R {
        f(&mut self.state.lock().payload)
    }
}
