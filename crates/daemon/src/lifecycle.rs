// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Daemon lifecycle management: startup, shutdown. Trimmed to what a
//! stateless request daemon needs (no WAL, no snapshot, no reconcile).

use std::fs::File;
use std::io::Write as _;
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;
use tokio::net::{TcpListener, UnixListener};
use tracing::{info, warn};

/// Daemon configuration: every path it reads or writes, resolved once
/// at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub endpoint_path: PathBuf,
}

impl Config {
    /// Load configuration for the user-level daemon. One daemon serves
    /// the local host process; there is no per-project instance.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;
        Ok(Self {
            socket_path: state_dir.join("hd.sock"),
            lock_path: state_dir.join("hd.pid"),
            endpoint_path: state_dir.join("hd.endpoint"),
            state_dir,
        })
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind unix socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("failed to bind tcp listener on port {0}: {1}")]
    TcpBindFailed(u16, std::io::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything startup hands back: the bound listeners plus the held
/// resources (lock file) that must outlive the daemon's run loop.
pub struct StartupResult {
    pub unix: UnixListener,
    pub tcp: Option<TcpListener>,
    /// Held only to keep the exclusive lock alive; released on drop.
    #[allow(dead_code)]
    lock_file: File,
}

/// Start the daemon: acquire the lock, bind the socket(s), write the
/// endpoint-info file. On failure, any partially-created files are
/// cleaned up except when the failure is itself "another daemon holds
/// the lock" -- those files belong to the instance that is still
/// running.
pub async fn startup(config: &Config, tcp_port: Option<u16>) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config, tcp_port).await {
        Ok(result) => Ok(result),
        Err(e) => {
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config, tcp_port: Option<u16>) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Acquire the lock file first to prevent two daemons racing for the
    // same socket. Avoid truncating until the lock is actually held, so
    // a failed attempt never wipes the running daemon's PID.
    let lock_file =
        std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let unix = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    let tcp = match tcp_port {
        Some(port) => Some(
            TcpListener::bind(("127.0.0.1", port))
                .await
                .map_err(|e| LifecycleError::TcpBindFailed(port, e))?,
        ),
        None => None,
    };

    let endpoint = match tcp_port {
        Some(port) => format!("unix:{}\ntcp:127.0.0.1:{port}\n", config.socket_path.display()),
        None => format!("unix:{}\n", config.socket_path.display()),
    };
    std::fs::write(&config.endpoint_path, endpoint)?;

    info!(socket = %config.socket_path.display(), tcp_port = ?tcp_port, "daemon listening");

    Ok(StartupResult { unix, tcp, lock_file })
}

fn cleanup_on_failure(config: &Config) {
    let _ = std::fs::remove_file(&config.socket_path);
    let _ = std::fs::remove_file(&config.lock_path);
    let _ = std::fs::remove_file(&config.endpoint_path);
}

/// Shut down cleanly: forcibly destroy every live resource, child-first,
/// then remove the files a fresh startup would otherwise have to step
/// around. The lock is released when `StartupResult`'s `lock_file` is
/// dropped by the caller.
///
/// Only root (parentless) entries are destroyed directly -- `destroy`
/// already cascades to children first, and destroying a child whose
/// parent is also about to go is redundant work on a shutdown path
/// where nothing else can be racing the registry.
pub fn shutdown(config: &Config, registry: &hd_registry::Registry) {
    info!("shutting down daemon");
    let roots: Vec<String> =
        registry.all_entries().iter().filter(|e| e.parent_id.is_none()).map(|e| e.id.clone()).collect();
    for id in &roots {
        registry.destroy(id);
    }
    for path in [&config.socket_path, &config.endpoint_path, &config.lock_path] {
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "failed to remove file during shutdown");
            }
        }
    }
    info!("daemon shutdown complete");
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
