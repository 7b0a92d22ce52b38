// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Background sweep that evicts idle resources past their TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use hd_core::unix_seconds;
use tracing::{debug, warn};

use crate::kind::Kind;
use crate::registry::Registry;

/// Default idle TTL applied to every kind absent an override.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default sweep interval.
pub const DEFAULT_REAPER_INTERVAL: Duration = Duration::from_secs(30);

/// Per-kind idle TTLs, with a fallback for kinds not explicitly configured.
#[derive(Clone)]
pub struct TtlPolicy {
    default: Duration,
    overrides: HashMap<Kind, Duration>,
}

impl TtlPolicy {
    pub fn uniform(default: Duration) -> Self {
        Self { default, overrides: HashMap::new() }
    }

    pub fn with_override(mut self, kind: Kind, ttl: Duration) -> Self {
        self.overrides.insert(kind, ttl);
        self
    }

    pub fn ttl_for(&self, kind: Kind) -> Duration {
        self.overrides.get(&kind).copied().unwrap_or(self.default)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::uniform(DEFAULT_TTL)
    }
}

/// Scan the registry once, evicting any entry idle past its kind's TTL.
/// Returns the ids destroyed. Eviction is child-first because
/// [`Registry::destroy`] always cascades to children before removing
/// the parent.
///
/// Every entry is checked against its own kind's TTL independently,
/// including children of a still-live parent -- a statement can go idle
/// well before its connection does, and this policy carves out no
/// exemption for that case. `destroy` is idempotent, so a child
/// evicted here and a parent evicted on a later sweep (or the same one,
/// via a different iteration order) never conflict: whichever runs
/// first simply removes an id the other no longer finds.
pub fn sweep_once(registry: &Registry, policy: &TtlPolicy) -> Vec<String> {
    let now = unix_seconds(registry.clock().now());
    let mut destroyed = Vec::new();

    for entry in registry.all_entries() {
        let ttl = policy.ttl_for(entry.kind);
        let idle_since = entry.last_used_at();
        if now.saturating_sub(idle_since) >= ttl.as_secs() {
            debug!(id = %entry.id, kind = ?entry.kind, "reaper evicting idle resource");
            let ids = registry.destroy(&entry.id);
            destroyed.extend(ids);
        }
    }

    destroyed
}

/// Spawn the reaper as a background task that sweeps every `interval`
/// until `shutdown` fires.
pub fn spawn(
    registry: Arc<Registry>,
    policy: TtlPolicy,
    interval: Duration,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let destroyed = sweep_once(&registry, &policy);
                    if !destroyed.is_empty() {
                        warn!(count = destroyed.len(), "reaper evicted idle resources");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
