// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

use super::*;

#[test]
fn now_reports_both_a_formatted_string_and_an_epoch() {
    let result = now(Params::new(json!({}))).unwrap();
    assert!(result["formatted"].as_str().unwrap().ends_with('Z'));
    assert!(result["epoch_seconds"].as_i64().unwrap() > 0);
}

#[test]
fn parse_then_format_round_trips_through_the_default_format() {
    let parsed = parse(Params::new(json!({"value": "2024-01-02T03:04:05Z"}))).unwrap();
    let epoch = parsed["epoch_seconds"].as_i64().unwrap();

    let formatted = format(Params::new(json!({"value": epoch}))).unwrap();
    assert_eq!(formatted["formatted"], json!("2024-01-02T03:04:05Z"));
}

#[test]
fn parse_rejects_input_that_does_not_match_the_format() {
    let err = parse(Params::new(json!({"value": "not-a-date"}))).unwrap_err();
    assert!(matches!(err, HelperError::InvalidParams(_)));
}

#[test]
fn add_seconds_advances_the_epoch_by_the_given_delta() {
    let result = add_seconds(Params::new(json!({"value": 1000, "seconds": 42}))).unwrap();
    assert_eq!(result["epoch_seconds"], json!(1042));
}

#[test]
fn add_seconds_accepts_a_negative_delta() {
    let result = add_seconds(Params::new(json!({"value": 1000, "seconds": -42}))).unwrap();
    assert_eq!(result["epoch_seconds"], json!(958));
}

#[test]
fn diff_seconds_is_to_minus_from() {
    let result = diff_seconds(Params::new(json!({"from": 100, "to": 142}))).unwrap();
    assert_eq!(result["diff_seconds"], json!(42));
}

#[test]
fn format_rejects_a_non_integer_value() {
    let err = format(Params::new(json!({"value": "nope"}))).unwrap_err();
    assert!(matches!(err, HelperError::InvalidParams(_)));
}

#[test]
fn unknown_function_is_rejected_by_the_module_dispatch() {
    let c = HelperCtx {
        registry: std::sync::Arc::new(hd_registry::Registry::new(std::sync::Arc::new(hd_core::SystemClock))),
        health: std::sync::Arc::new(crate::health::HealthState::new()),
    };
    let err = DatetimeModule.dispatch("time_travel", Params::new(json!({})), &c).unwrap_err();
    assert!(matches!(err, HelperError::UnknownFunction(_)));
}
