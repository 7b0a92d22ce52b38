// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Entry point for `hdd`, the legacy helper daemon.

use std::sync::Arc;

use hd_daemon::{env, lifecycle, ListenCtx, Listener};
use hd_helpers::{full_registry, install_release_hooks, HealthState, HelperCtx};
use hd_registry::{Registry, TtlPolicy};
use tokio::sync::{watch, Semaphore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "daemon exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), lifecycle::LifecycleError> {
    let config = lifecycle::Config::load()?;
    let tcp_port = env::tcp_port();
    let startup = lifecycle::startup(&config, tcp_port).await?;

    let registry = Arc::new(Registry::new(Arc::new(hd_core::SystemClock)));
    install_release_hooks(&registry);
    let health = Arc::new(HealthState::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let reaper = hd_registry::spawn_reaper(
        Arc::clone(&registry),
        TtlPolicy::uniform(env::idle_ttl()),
        env::reaper_interval(),
        shutdown_rx.clone(),
    );
    let health_log = hd_daemon::health_log::spawn(
        Arc::clone(&registry),
        Arc::clone(&health),
        env::health_log_interval(),
        shutdown_rx.clone(),
    );

    let listen_ctx = Arc::new(ListenCtx {
        dispatcher: full_registry(),
        helper_ctx: HelperCtx { registry: Arc::clone(&registry), health: Arc::clone(&health) },
        max_request_bytes: env::max_request_bytes(),
        request_timeout: env::request_timeout(),
        auth_token: env::auth_token(),
        workers: Arc::new(Semaphore::new(env::max_workers())),
    });
    let listener = Listener::new(startup.unix, startup.tcp, listen_ctx);
    let listener_task = tokio::spawn(listener.run(shutdown_rx));

    wait_for_shutdown_signal().await?;
    info!("shutdown signal received, draining connections");

    let _ = shutdown_tx.send(true);
    let drain = tokio::time::timeout(env::drain_timeout(), listener_task);
    if drain.await.is_err() {
        info!("drain timeout elapsed, forcing shutdown");
    }
    let _ = reaper.await;
    let _ = health_log.await;

    lifecycle::shutdown(&config, &registry);
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<(), lifecycle::LifecycleError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<(), lifecycle::LifecycleError> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
