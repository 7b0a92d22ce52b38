// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Crypto helper end-to-end: cipher round-trip and idempotent cleanup.

use crate::support::TestDaemon;
use serde_json::json;

#[tokio::test]
async fn blowfish_round_trip_and_idempotent_cleanup() {
    let daemon = TestDaemon::start().await;

    let new_cipher = daemon.call("crypto", "new", json!({"key": "MySecretKey123", "cipher": "Blowfish"})).await;
    assert!(new_cipher.success);
    let cipher_id = new_cipher.result.unwrap()["cipher_id"].as_str().unwrap().to_string();

    let encrypt = daemon
        .call("crypto", "encrypt", json!({"cipher_id": cipher_id, "plaintext_hex": "48656c6c6f"}))
        .await;
    assert!(encrypt.success);
    let ciphertext_hex = encrypt.result.unwrap()["encrypted"].as_str().unwrap().to_string();

    let decrypt = daemon
        .call("crypto", "decrypt", json!({"cipher_id": cipher_id, "hex_ciphertext": ciphertext_hex}))
        .await;
    assert!(decrypt.success);
    assert_eq!(decrypt.result.unwrap()["decrypted_hex"], json!("48656c6c6f"));

    let cleanup_once = daemon.call("crypto", "cleanup_cipher", json!({"cipher_id": cipher_id})).await;
    assert!(cleanup_once.success);
    let cleanup_twice = daemon.call("crypto", "cleanup_cipher", json!({"cipher_id": cipher_id})).await;
    assert!(cleanup_twice.success);

    daemon.shutdown().await;
}

#[tokio::test]
async fn unsupported_cipher_name_is_an_invalid_param() {
    let daemon = TestDaemon::start().await;

    let response = daemon.call("crypto", "new", json!({"key": "k", "cipher": "rot13"})).await;

    assert!(!response.success);
    assert_eq!(response.error_kind, Some(hd_core::ErrorKind::InvalidParams));

    daemon.shutdown().await;
}

#[tokio::test]
async fn operating_on_a_cleaned_up_cipher_is_not_found() {
    let daemon = TestDaemon::start().await;

    let new_cipher = daemon.call("crypto", "new", json!({"key": "k", "cipher": "Blowfish"})).await;
    let cipher_id = new_cipher.result.unwrap()["cipher_id"].as_str().unwrap().to_string();
    daemon.call("crypto", "cleanup_cipher", json!({"cipher_id": cipher_id})).await;

    let response = daemon
        .call("crypto", "encrypt", json!({"cipher_id": cipher_id, "plaintext_hex": "00"}))
        .await;

    assert!(!response.success);
    assert_eq!(response.error_kind, Some(hd_core::ErrorKind::NotFound));

    daemon.shutdown().await;
}
