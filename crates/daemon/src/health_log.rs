// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Periodic health-to-log emission: a background task that logs its own
//! collector's state rather than exposing a separate metrics endpoint.

use std::sync::Arc;
use std::time::Duration;

use hd_helpers::HealthState;
use hd_registry::Registry;
use tracing::{info, warn};

/// Requests-failed ratio above which a health tick logs at `warn`
/// instead of `info`.
const FAILURE_RATIO_WARN_THRESHOLD: f64 = 0.1;

pub fn spawn(
    registry: Arc<Registry>,
    health: Arc<HealthState>,
    interval: Duration,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => log_once(&registry, &health),
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    })
}

fn log_once(registry: &Registry, health: &HealthState) {
    let processed = health.requests_processed();
    let failed = health.requests_failed();
    let (active, peak) = health.active_connections();
    let resources = registry.stats();
    let failure_ratio = if processed == 0 { 0.0 } else { failed as f64 / processed as f64 };

    if failure_ratio > FAILURE_RATIO_WARN_THRESHOLD {
        warn!(
            uptime_seconds = health.uptime_seconds(),
            requests_processed = processed,
            requests_failed = failed,
            failure_ratio,
            active_connections = active,
            peak_connections = peak,
            ?resources,
            "health check: elevated failure ratio"
        );
    } else {
        info!(
            uptime_seconds = health.uptime_seconds(),
            requests_processed = processed,
            requests_failed = failed,
            active_connections = active,
            peak_connections = peak,
            ?resources,
            "health check"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_quiet_daemon_never_crosses_the_warn_threshold() {
        let registry = Registry::new(Arc::new(hd_core::SystemClock));
        let health = HealthState::new();
        health.record_request(false);
        health.record_request(false);
        // exercised for its side effect (tracing output); asserts only
        // that it doesn't panic on a healthy daemon
        log_once(&registry, &health);
    }
}
