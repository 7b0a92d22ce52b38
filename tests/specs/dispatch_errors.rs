// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Dispatch error reporting: an unknown module, plus the envelope shape
//! every response must have -- `success` is boolean, and on success
//! `result` is present while on failure `error`/`error_kind` are.

use crate::support::TestDaemon;
use serde_json::json;

#[tokio::test]
async fn unknown_module_is_reported_as_such() {
    let daemon = TestDaemon::start().await;

    let response = daemon.call("nope", "x", json!({})).await;

    assert!(!response.success);
    assert_eq!(response.error_kind, Some(hd_core::ErrorKind::UnknownModule));
    assert!(response.error.is_some());
    assert!(response.result.is_none());

    daemon.shutdown().await;
}

#[tokio::test]
async fn unknown_function_on_a_known_module_is_distinguished_from_unknown_module() {
    let daemon = TestDaemon::start().await;

    let response = daemon.call("crypto", "teleport", json!({})).await;

    assert!(!response.success);
    assert_eq!(response.error_kind, Some(hd_core::ErrorKind::UnknownFunction));

    daemon.shutdown().await;
}

#[tokio::test]
async fn every_response_carries_success_plus_the_shape_that_implies() {
    let daemon = TestDaemon::start().await;

    let calls: Vec<(&str, &str, serde_json::Value)> = vec![
        ("test", "ping", json!({})),
        ("nope", "x", json!({})),
        ("db", "prepare", json!({"connection_id": "conn_missing", "sql": "SELECT 1"})),
        ("crypto", "new", json!({"key": "k", "cipher": "not-a-cipher"})),
    ];

    for (module, function, params) in calls {
        let response = daemon.call(module, function, params).await;
        if response.success {
            assert!(response.result.is_some(), "{module}.{function}: success without result");
            assert!(response.error.is_none(), "{module}.{function}: success with error set");
        } else {
            assert!(response.error.is_some(), "{module}.{function}: failure without error");
            assert!(response.error_kind.is_some(), "{module}.{function}: failure without error_kind");
            assert!(response.result.is_none(), "{module}.{function}: failure with result set");
        }
    }

    daemon.shutdown().await;
}

#[tokio::test]
async fn request_id_is_echoed_back_on_both_success_and_failure() {
    let daemon = TestDaemon::start().await;

    let success = daemon
        .call_with_request_id("test", "ping", json!({}), Some("corr-1".to_string()))
        .await;
    assert_eq!(success.request_id.as_deref(), Some("corr-1"));

    let failure = daemon
        .call_with_request_id("nope", "x", json!({}), Some("corr-2".to_string()))
        .await;
    assert_eq!(failure.request_id.as_deref(), Some("corr-2"));

    daemon.shutdown().await;
}
