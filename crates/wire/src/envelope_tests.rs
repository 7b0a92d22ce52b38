// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

use super::*;

#[test]
fn request_without_params_defaults_to_empty_object() {
    let json = r#"{"module":"test","function":"ping"}"#;
    let req: Request = serde_json::from_str(json).unwrap();
    assert_eq!(req.module, "test");
    assert_eq!(req.function, "ping");
    assert_eq!(req.params, Value::Object(serde_json::Map::new()));
    assert_eq!(req.request_id, None);
}

#[test]
fn request_echoes_request_id() {
    let json = r#"{"module":"test","function":"ping","request_id":"abc-1"}"#;
    let req: Request = serde_json::from_str(json).unwrap();
    assert_eq!(req.request_id.as_deref(), Some("abc-1"));
}

#[test]
fn request_ignores_unknown_top_level_fields() {
    let json = r#"{"module":"test","function":"ping","bogus":true}"#;
    let req: Request = serde_json::from_str(json).unwrap();
    assert_eq!(req.function, "ping");
}

#[test]
fn ok_response_serializes_success_true_with_result() {
    let resp = Response::ok(serde_json::json!({"ok": true}));
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["result"]["ok"], true);
    assert!(json.get("error").is_none());
}

#[test]
fn err_response_serializes_success_false_with_error_kind() {
    let resp = Response::err("boom", ErrorKind::DriverError);
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "boom");
    assert_eq!(json["error_kind"], "driver_error");
    assert!(json.get("result").is_none());
}
