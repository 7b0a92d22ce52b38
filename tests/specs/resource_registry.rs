// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Registry invariants -- id uniqueness, no dangling children, and
//! idempotent release -- exercised through the dispatcher rather than
//! the registry directly. The registry's own unit tests already cover
//! these at the API level; this confirms the helper wiring preserves
//! them end to end.

use crate::support::TestDaemon;
use serde_json::json;
use std::collections::HashSet;

#[tokio::test]
async fn ten_thousand_created_resources_have_unique_ids() {
    let daemon = TestDaemon::start().await;

    let mut ids = HashSet::new();
    for _ in 0..10_000 {
        let response = daemon.call("crypto", "new", json!({"key": "k", "cipher": "Blowfish"})).await;
        let id = response.result.unwrap()["cipher_id"].as_str().unwrap().to_string();
        assert!(ids.insert(id), "duplicate cipher_id returned");
    }

    daemon.shutdown().await;
}

#[tokio::test]
async fn destroying_a_connection_makes_its_statement_unreachable() {
    let daemon = TestDaemon::start().await;

    let connect = daemon
        .call("db", "connect", json!({"dsn": "dbi:Oracle:sid=XE", "username": "hr", "password": "pw"}))
        .await;
    let conn_id = connect.result.unwrap()["connection_id"].as_str().unwrap().to_string();

    let prepare = daemon
        .call("db", "prepare", json!({"connection_id": conn_id, "sql": "SELECT 1 FROM DUAL"}))
        .await;
    let stmt_id = prepare.result.unwrap()["statement_id"].as_str().unwrap().to_string();

    daemon.call("db", "disconnect", json!({"connection_id": conn_id})).await;

    // The child statement's id must no longer resolve to anything --
    // evicting a parent evicts all children transitively.
    let fetch = daemon
        .call("db", "fetch_row", json!({"connection_id": conn_id, "statement_id": stmt_id, "format": "array"}))
        .await;
    assert!(!fetch.success);
    assert_eq!(fetch.error_kind, Some(hd_core::ErrorKind::NotFound));

    let finish = daemon.call("db", "finish_statement", json!({"connection_id": conn_id, "statement_id": stmt_id})).await;
    // finish_statement is itself idempotent-release, so a dangling
    // statement id still reports success rather than erroring.
    assert!(finish.success);

    daemon.shutdown().await;
}

#[tokio::test]
async fn release_functions_are_idempotent_across_every_kind_with_one() {
    let daemon = TestDaemon::start().await;

    let cipher = daemon.call("crypto", "new", json!({"key": "k", "cipher": "Blowfish"})).await;
    let cipher_id = cipher.result.unwrap()["cipher_id"].as_str().unwrap().to_string();
    for _ in 0..2 {
        let response = daemon.call("crypto", "cleanup_cipher", json!({"cipher_id": cipher_id})).await;
        assert!(response.success);
    }

    let connect = daemon
        .call("db", "connect", json!({"dsn": "dbi:Oracle:sid=XE", "username": "hr", "password": "pw"}))
        .await;
    let conn_id = connect.result.unwrap()["connection_id"].as_str().unwrap().to_string();
    for _ in 0..2 {
        let response = daemon.call("db", "disconnect", json!({"connection_id": conn_id})).await;
        assert!(response.success);
    }

    daemon.shutdown().await;
}
