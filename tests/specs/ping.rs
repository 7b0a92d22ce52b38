// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Liveness and health end-to-end: `test.ping` and `test.health`.

use crate::support::TestDaemon;
use serde_json::json;

#[tokio::test]
async fn ping_reports_ok_and_a_nonnegative_uptime() {
    let daemon = TestDaemon::start().await;

    let response = daemon.call("test", "ping", json!({})).await;

    assert!(response.success);
    let result = response.result.expect("result present on success");
    assert_eq!(result["ok"], true);
    assert!(result["uptime_seconds"].as_u64().is_some());

    daemon.shutdown().await;
}

#[tokio::test]
async fn health_reports_uptime_and_per_kind_resource_counts() {
    let daemon = TestDaemon::start().await;

    daemon.call("crypto", "new", json!({"key": "k", "cipher": "Blowfish"})).await;
    let response = daemon.call("test", "health", json!({})).await;

    assert!(response.success);
    let result = response.result.expect("result present on success");
    assert_eq!(result["resources"]["cipher"], 1);
    assert_eq!(result["active_connections"]["current"], 0);

    daemon.shutdown().await;
}
