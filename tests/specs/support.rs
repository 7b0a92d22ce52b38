// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Shared harness: bind a real daemon listener on a temporary Unix
//! socket and exchange length-delimited JSON frames with it, the same
//! way a real client would.

use std::sync::Arc;
use std::time::Duration;

use hd_daemon::{ListenCtx, Listener};
use hd_helpers::{full_registry, install_release_hooks, HealthState, HelperCtx};
use hd_registry::Registry;
use hd_wire::{Request, Response};
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{watch, Semaphore};

/// A running daemon instance plus everything needed to tear it down.
pub struct TestDaemon {
    _dir: TempDir,
    socket_path: std::path::PathBuf,
    shutdown_tx: watch::Sender<bool>,
    listener_task: tokio::task::JoinHandle<()>,
}

impl TestDaemon {
    /// Start a daemon listening on a fresh temporary socket path, using
    /// the real helper registration table. The
    /// `test-support` feature on `hd-helpers` swaps the database
    /// module's native drivers for its in-memory fake, so `db.*`
    /// scenarios exercise the full state machine without a live
    /// Oracle/Informix instance.
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let socket_path = dir.path().join("hd.sock");
        let unix = UnixListener::bind(&socket_path).expect("bind unix socket");

        let registry = Arc::new(Registry::new(Arc::new(hd_core::SystemClock)));
        install_release_hooks(&registry);
        let health = Arc::new(HealthState::new());
        let ctx = Arc::new(ListenCtx {
            dispatcher: full_registry(),
            helper_ctx: HelperCtx { registry, health },
            max_request_bytes: hd_wire::DEFAULT_MAX_REQUEST_BYTES,
            request_timeout: Duration::from_secs(5),
            auth_token: None,
            workers: Arc::new(Semaphore::new(8)),
        });

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let listener = Listener::new(unix, None, ctx);
        let listener_task = tokio::spawn(listener.run(shutdown_rx));

        Self { _dir: dir, socket_path, shutdown_tx, listener_task }
    }

    /// Send one request, return the parsed response -- exactly the
    /// one-request-per-connection contract the daemon expects.
    pub async fn call(&self, module: &str, function: &str, params: Value) -> Response {
        self.call_with_request_id(module, function, params, None).await
    }

    /// Same as [`Self::call`], but lets the caller set `request_id` to
    /// verify it is echoed back unchanged.
    pub async fn call_with_request_id(
        &self,
        module: &str,
        function: &str,
        params: Value,
        request_id: Option<String>,
    ) -> Response {
        let mut stream = UnixStream::connect(&self.socket_path).await.expect("connect");
        let mut request = Request::new(module, function, params);
        request.request_id = request_id;
        let bytes = serde_json::to_vec(&request).expect("encode request");
        hd_wire::write_message(&mut stream, &bytes).await.expect("write request");

        let response_bytes =
            hd_wire::read_message(&mut stream, hd_wire::DEFAULT_MAX_REQUEST_BYTES * 4)
                .await
                .expect("read response");
        serde_json::from_slice(&response_bytes).expect("decode response")
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = tokio::time::timeout(Duration::from_secs(2), self.listener_task).await;
    }
}
