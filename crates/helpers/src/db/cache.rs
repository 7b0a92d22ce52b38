// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! `connect_cached`: an LRU, TTL-bounded map from a connection's cache
//! key to the live `conn_*` id behind it, so repeat callers with the
//! same DSN/username/options get the same connection instead of opening
//! a new one every time.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::SystemTime;

use hd_core::{unix_seconds, Clock};
use parking_lot::Mutex;
use serde_json::{Map, Value};

pub const MAX_ENTRIES: usize = 50;
pub const TTL_SECS: u64 = 600;

struct CachedConn {
    conn_id: String,
    created_at: SystemTime,
}

struct CacheState {
    entries: HashMap<String, CachedConn>,
    /// Least-recently-used order; the front is evicted first.
    order: VecDeque<String>,
}

impl CacheState {
    fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_back(key.to_string());
    }
}

pub struct ConnectionCache {
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl ConnectionCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, state: Mutex::new(CacheState { entries: HashMap::new(), order: VecDeque::new() }) }
    }

    /// The cache key for a connect call: the caller's explicit
    /// `cache_key` if given, otherwise a key derived from
    /// `(dsn, username, options)`.
    pub fn key_for(explicit: Option<&str>, dsn: &str, username: Option<&str>, options: &Map<String, Value>) -> String {
        if let Some(k) = explicit {
            return format!("explicit:{k}");
        }
        format!("derived:{dsn}|{}|{}", username.unwrap_or(""), Value::Object(options.clone()))
    }

    /// A live, non-expired cached connection id for `key`, or `None` if
    /// there is no entry or it has aged past the TTL (in which case the
    /// stale entry is dropped here so the caller can open a fresh one).
    pub fn get(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock();
        let expired = match state.entries.get(key) {
            Some(c) => unix_seconds(self.clock.now()).saturating_sub(unix_seconds(c.created_at)) >= TTL_SECS,
            None => return None,
        };
        if expired {
            state.entries.remove(key);
            state.order.retain(|k| k != key);
            return None;
        }
        state.touch(key);
        state.entries.get(key).map(|c| c.conn_id.clone())
    }

    /// Record a freshly-opened connection under `key`, evicting the
    /// least-recently-used entry if the cache is already at capacity.
    /// Returns the evicted entry's conn_id, if any -- the caller is
    /// responsible for destroying it in the registry.
    pub fn insert(&self, key: String, conn_id: String) -> Option<String> {
        let mut state = self.state.lock();
        let evicted = if state.entries.len() >= MAX_ENTRIES && !state.entries.contains_key(&key) {
            state.order.pop_front().and_then(|k| state.entries.remove(&k)).map(|c| c.conn_id)
        } else {
            None
        };
        state.entries.insert(key.clone(), CachedConn { conn_id, created_at: self.clock.now() });
        state.touch(&key);
        evicted
    }

    /// Drop `key` from the cache (e.g. because its connection was
    /// explicitly disconnected), returning its conn_id if present.
    pub fn remove_by_conn_id(&self, conn_id: &str) -> Option<String> {
        let mut state = self.state.lock();
        let key = state.entries.iter().find(|(_, c)| c.conn_id == conn_id).map(|(k, _)| k.clone())?;
        state.entries.remove(&key);
        state.order.retain(|k| k != &key);
        Some(key)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.state.lock().entries.len()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
