// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn state_dir_prefers_hd_state_dir_over_everything_else() {
    std::env::set_var("HD_STATE_DIR", "/tmp/hd-explicit");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg-ignored");
    let dir = state_dir().unwrap();
    std::env::remove_var("HD_STATE_DIR");
    std::env::remove_var("XDG_STATE_HOME");
    assert_eq!(dir, PathBuf::from("/tmp/hd-explicit"));
}

#[test]
#[serial]
fn state_dir_falls_back_to_xdg_state_home() {
    std::env::remove_var("HD_STATE_DIR");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    let dir = state_dir().unwrap();
    std::env::remove_var("XDG_STATE_HOME");
    assert_eq!(dir, PathBuf::from("/tmp/xdg/hd"));
}

#[test]
#[serial]
fn request_timeout_defaults_to_thirty_seconds() {
    std::env::remove_var("HD_REQUEST_TIMEOUT_MS");
    assert_eq!(request_timeout(), Duration::from_secs(30));
}

#[test]
#[serial]
fn request_timeout_honors_override() {
    std::env::set_var("HD_REQUEST_TIMEOUT_MS", "1500");
    let timeout = request_timeout();
    std::env::remove_var("HD_REQUEST_TIMEOUT_MS");
    assert_eq!(timeout, Duration::from_millis(1500));
}

#[test]
#[serial]
fn auth_token_treats_empty_string_as_unset() {
    std::env::set_var("HD_AUTH_TOKEN", "");
    let token = auth_token();
    std::env::remove_var("HD_AUTH_TOKEN");
    assert_eq!(token, None);
}

#[test]
#[serial]
fn max_request_bytes_defaults_to_the_wire_default() {
    std::env::remove_var("HD_MAX_REQUEST_BYTES");
    assert_eq!(max_request_bytes(), hd_wire::DEFAULT_MAX_REQUEST_BYTES);
}
