// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! In-process metrics backing the `test.ping` / `test.health` RPCs.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Instant;

pub struct HealthState {
    start_time: Instant,
    requests_processed: AtomicU64,
    requests_failed: AtomicU64,
    active_connections_current: AtomicI64,
    active_connections_peak: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            requests_processed: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            active_connections_current: AtomicI64::new(0),
            active_connections_peak: AtomicU64::new(0),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn record_request(&self, failed: bool) {
        self.requests_processed.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.requests_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn connection_opened(&self) {
        let current = self.active_connections_current.fetch_add(1, Ordering::Relaxed) + 1;
        self.active_connections_peak.fetch_max(current.max(0) as u64, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections_current.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn requests_processed(&self) -> u64 {
        self.requests_processed.load(Ordering::Relaxed)
    }

    pub fn requests_failed(&self) -> u64 {
        self.requests_failed.load(Ordering::Relaxed)
    }

    pub fn active_connections(&self) -> (i64, u64) {
        (
            self.active_connections_current.load(Ordering::Relaxed),
            self.active_connections_peak.load(Ordering::Relaxed),
        )
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_tracks_the_high_water_mark_not_the_current_value() {
        let h = HealthState::new();
        h.connection_opened();
        h.connection_opened();
        h.connection_opened();
        h.connection_closed();
        let (current, peak) = h.active_connections();
        assert_eq!(current, 2);
        assert_eq!(peak, 3);
    }

    #[test]
    fn request_counters_split_failed_from_total() {
        let h = HealthState::new();
        h.record_request(false);
        h.record_request(true);
        h.record_request(false);
        assert_eq!(h.requests_processed(), 3);
        assert_eq!(h.requests_failed(), 1);
    }
}
