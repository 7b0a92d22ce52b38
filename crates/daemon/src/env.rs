// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve the state directory: `HD_STATE_DIR` > `XDG_STATE_HOME/hd` >
/// `~/.local/state/hd`.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("HD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("hd"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/hd"))
}

/// Per-request deadline, default 30 s.
pub fn request_timeout() -> Duration {
    std::env::var("HD_REQUEST_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// Maximum accepted request frame size in bytes, default 64 KiB.
pub fn max_request_bytes() -> u32 {
    std::env::var("HD_MAX_REQUEST_BYTES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(hd_wire::DEFAULT_MAX_REQUEST_BYTES)
}

/// Maximum number of connections handled concurrently, default 32.
pub fn max_workers() -> usize {
    std::env::var("HD_MAX_WORKERS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(32)
}

/// TCP port for remote connections. When set, the daemon listens on this
/// port in addition to the Unix socket.
pub fn tcp_port() -> Option<u16> {
    std::env::var("HD_TCP_PORT").ok().and_then(|s| s.parse::<u16>().ok())
}

/// Auth token required of TCP connections. Unix-socket connections are
/// trusted by filesystem permissions alone and never consult this.
pub fn auth_token() -> Option<String> {
    std::env::var("HD_AUTH_TOKEN").ok().filter(|s| !s.is_empty())
}

/// Idle TTL applied to every resource kind absent a more specific policy,
/// default 300 s.
pub fn idle_ttl() -> Duration {
    std::env::var("HD_IDLE_TTL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(hd_registry::DEFAULT_TTL)
}

/// Reaper sweep interval, default 30 s.
pub fn reaper_interval() -> Duration {
    std::env::var("HD_REAPER_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(hd_registry::DEFAULT_REAPER_INTERVAL)
}

/// Interval between periodic `tracing` health emissions, default 60 s.
pub fn health_log_interval() -> Duration {
    std::env::var("HD_HEALTH_LOG_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(60))
}

/// Shutdown drain grace period, default 10 s.
pub fn drain_timeout() -> Duration {
    std::env::var("HD_DRAIN_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
