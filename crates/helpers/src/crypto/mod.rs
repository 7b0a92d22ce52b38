// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Symmetric cipher helper, following the registry contract shared by
//! every resource-backed helper module (constructor returns an id,
//! operations take that id, release is idempotent).
//!
//! Modeled on the legacy `Crypt::CBC`-style API this daemon stands in
//! for: construct a cipher instance from a key and an algorithm name,
//! then encrypt/decrypt hex-encoded byte strings against it. CBC mode
//! with PKCS#7 padding and a fixed all-zero IV -- this helper exists to
//! offload a library dependency for a trusted local caller, not to be a
//! general-purpose crypto service, so there is no per-message IV
//! negotiation on the wire.

mod algo;

use serde_json::{json, Value};

use crate::error::HelperError;
use crate::module::{HelperCtx, HelperModule};
use crate::params::Params;
use algo::{CipherAlgo, CipherPayload};

pub struct CryptoModule;

impl HelperModule for CryptoModule {
    fn name(&self) -> &'static str {
        "crypto"
    }

    fn functions(&self) -> &'static [&'static str] {
        &["new", "encrypt", "decrypt", "cleanup_cipher"]
    }

    fn dispatch(
        &self,
        function: &str,
        params: Params,
        ctx: &HelperCtx,
    ) -> Result<Value, HelperError> {
        match function {
            "new" => new_cipher(params, ctx),
            "encrypt" => encrypt(params, ctx),
            "decrypt" => decrypt(params, ctx),
            "cleanup_cipher" => cleanup_cipher(params, ctx),
            other => Err(HelperError::UnknownFunction(other.to_string())),
        }
    }
}

fn new_cipher(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let key = params.required_str("key", 0)?;
    let cipher_name = params.required_str("cipher", 1)?;
    let algo = CipherAlgo::parse(&cipher_name)
        .ok_or_else(|| HelperError::InvalidParams(format!("unsupported cipher: {cipher_name}")))?;

    let payload = CipherPayload { algo, key: key.into_bytes() };
    let id = ctx.registry.create(
        hd_registry::Kind::Cipher,
        Box::new(payload),
        None,
        json!({"cipher": cipher_name}),
    );
    Ok(json!({"cipher_id": id}))
}

fn encrypt(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let cipher_id = params.required_str("cipher_id", 0)?;
    let plaintext_hex = params.required_str("plaintext_hex", 1)?;
    let plaintext = hex::decode(&plaintext_hex)
        .map_err(|e| HelperError::InvalidParams(format!("plaintext_hex is not valid hex: {e}")))?;

    let entry = ctx.registry.get(&cipher_id, Some(hd_registry::Kind::Cipher))?;
    let encrypted = entry.with_state(&**ctx.registry.clock(), |state| {
        let payload = state
            .payload
            .downcast_ref::<CipherPayload>()
            .ok_or_else(|| HelperError::Internal("cipher payload type mismatch".into()))?;
        Ok::<_, HelperError>(payload.algo.encrypt(&payload.key, &plaintext))
    })?;

    Ok(json!({"encrypted": hex::encode(encrypted)}))
}

fn decrypt(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let cipher_id = params.required_str("cipher_id", 0)?;
    let hex_ciphertext = params.required_str("hex_ciphertext", 1)?;
    let ciphertext = hex::decode(&hex_ciphertext)
        .map_err(|e| HelperError::InvalidParams(format!("hex_ciphertext is not valid hex: {e}")))?;

    let entry = ctx.registry.get(&cipher_id, Some(hd_registry::Kind::Cipher))?;
    let decrypted = entry.with_state(&**ctx.registry.clock(), |state| {
        let payload = state
            .payload
            .downcast_ref::<CipherPayload>()
            .ok_or_else(|| HelperError::Internal("cipher payload type mismatch".into()))?;
        payload
            .algo
            .decrypt(&payload.key, &ciphertext)
            .map_err(|e| HelperError::DriverError(format!("decrypt failed: {e}")))
    })?;

    Ok(json!({"decrypted_hex": hex::encode(decrypted)}))
}

fn cleanup_cipher(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let cipher_id = params.required_str("cipher_id", 0)?;
    ctx.registry.destroy(&cipher_id);
    Ok(json!({"success": true}))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
