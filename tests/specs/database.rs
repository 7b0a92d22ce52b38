// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Database helper end-to-end: connect + simple select, and fetch
//! before execute.
//!
//! Runs against the `db` helper's fake driver (enabled transitively by
//! this workspace's `hd-helpers/test-support` dev-dependency), which
//! gives `SELECT 1 FROM DUAL` exactly one synthetic row.

use crate::support::TestDaemon;
use serde_json::json;

#[tokio::test]
async fn connect_prepare_execute_fetch_and_disconnect_round_trip() {
    let daemon = TestDaemon::start().await;

    let connect = daemon
        .call("db", "connect", json!({"dsn": "dbi:Oracle:sid=XE", "username": "hr", "password": "pw"}))
        .await;
    assert!(connect.success);
    let conn_id = connect.result.unwrap()["connection_id"].as_str().unwrap().to_string();

    let prepare = daemon
        .call("db", "prepare", json!({"connection_id": conn_id, "sql": "SELECT 1 FROM DUAL"}))
        .await;
    assert!(prepare.success);
    let stmt_id = prepare.result.unwrap()["statement_id"].as_str().unwrap().to_string();

    let execute = daemon
        .call(
            "db",
            "execute_statement",
            json!({"connection_id": conn_id, "statement_id": stmt_id, "bind_values": [], "bind_params": {}}),
        )
        .await;
    assert!(execute.success);
    let execute_result = execute.result.unwrap();
    assert!(matches!(execute_result["rows_affected"].as_i64(), Some(-1) | Some(1)));
    assert_eq!(execute_result["column_info"]["count"], 1);

    let first_fetch = daemon
        .call("db", "fetch_row", json!({"connection_id": conn_id, "statement_id": stmt_id, "format": "array"}))
        .await;
    assert!(first_fetch.success);
    assert_eq!(first_fetch.result.unwrap()["row"], json!([1]));

    let second_fetch = daemon
        .call("db", "fetch_row", json!({"connection_id": conn_id, "statement_id": stmt_id, "format": "array"}))
        .await;
    assert!(second_fetch.success);
    assert_eq!(second_fetch.result.unwrap()["row"], json!(null));

    let finish = daemon.call("db", "finish_statement", json!({"connection_id": conn_id, "statement_id": stmt_id})).await;
    assert!(finish.success);

    let disconnect_once = daemon.call("db", "disconnect", json!({"connection_id": conn_id})).await;
    assert!(disconnect_once.success);
    // Release is idempotent.
    let disconnect_twice = daemon.call("db", "disconnect", json!({"connection_id": conn_id})).await;
    assert!(disconnect_twice.success);

    daemon.shutdown().await;
}

#[tokio::test]
async fn fetch_before_execute_is_a_state_error() {
    let daemon = TestDaemon::start().await;

    let connect = daemon
        .call("db", "connect", json!({"dsn": "dbi:Oracle:sid=XE", "username": "hr", "password": "pw"}))
        .await;
    let conn_id = connect.result.unwrap()["connection_id"].as_str().unwrap().to_string();

    let prepare = daemon
        .call("db", "prepare", json!({"connection_id": conn_id, "sql": "SELECT 1 FROM DUAL"}))
        .await;
    let stmt_id = prepare.result.unwrap()["statement_id"].as_str().unwrap().to_string();

    let fetch = daemon
        .call("db", "fetch_row", json!({"connection_id": conn_id, "statement_id": stmt_id, "format": "array"}))
        .await;

    assert!(!fetch.success);
    assert_eq!(fetch.error_kind, Some(hd_core::ErrorKind::StateError));

    daemon.shutdown().await;
}

#[tokio::test]
async fn unknown_connection_id_is_not_found() {
    let daemon = TestDaemon::start().await;

    let response = daemon.call("db", "prepare", json!({"connection_id": "conn_doesnotexist", "sql": "SELECT 1"})).await;

    assert!(!response.success);
    assert_eq!(response.error_kind, Some(hd_core::ErrorKind::NotFound));

    daemon.shutdown().await;
}

#[tokio::test]
async fn rejecting_an_unrecognized_dsn_family_never_creates_a_connection() {
    let daemon = TestDaemon::start().await;

    let response = daemon.call("db", "connect", json!({"dsn": "dbi:Postgres:host=x", "username": "u"})).await;

    assert!(!response.success);
    assert_eq!(response.error_kind, Some(hd_core::ErrorKind::InvalidParams));

    let health = daemon.call("test", "health", json!({})).await;
    assert_eq!(health.result.unwrap()["resources"]["conn"], 0);

    daemon.shutdown().await;
}
