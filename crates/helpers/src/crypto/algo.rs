// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Cipher algorithm dispatch: normalizes a caller-supplied key to each
//! algorithm's required length and drives CBC+PKCS7 via the `cipher`
//! crate traits shared by every RustCrypto block cipher.

use aes::Aes256;
use blowfish::Blowfish;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type BlowfishCbcEnc = cbc::Encryptor<Blowfish>;
type BlowfishCbcDec = cbc::Decryptor<Blowfish>;

/// The native handle stored in the registry for a `cipher_*` resource.
pub struct CipherPayload {
    pub algo: CipherAlgo,
    pub key: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherAlgo {
    Blowfish,
    Aes256,
}

impl CipherAlgo {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "blowfish" => Some(CipherAlgo::Blowfish),
            "aes-256" | "aes256" | "aes" => Some(CipherAlgo::Aes256),
            _ => None,
        }
    }

    /// Required key length in bytes, and block size in bytes.
    fn key_len(&self) -> usize {
        match self {
            CipherAlgo::Blowfish => 16,
            CipherAlgo::Aes256 => 32,
        }
    }

    fn block_size(&self) -> usize {
        match self {
            CipherAlgo::Blowfish => 8,
            CipherAlgo::Aes256 => 16,
        }
    }

    /// Normalize an arbitrary-length caller key to the cipher's fixed
    /// key length: truncate if longer, cyclically repeat if shorter.
    /// A fixed all-zero IV is used for every message -- this helper
    /// offloads a legacy library dependency for a trusted local caller,
    /// not a general-purpose crypto service.
    fn key_bytes(&self, key: &[u8]) -> Vec<u8> {
        let len = self.key_len();
        if key.is_empty() {
            return vec![0u8; len];
        }
        (0..len).map(|i| key[i % key.len()]).collect()
    }

    fn iv(&self) -> Vec<u8> {
        vec![0u8; self.block_size()]
    }

    pub fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let key = self.key_bytes(key);
        let iv = self.iv();
        match self {
            CipherAlgo::Blowfish => {
                BlowfishCbcEnc::new(key.as_slice().into(), iv.as_slice().into())
                    .encrypt_padded_vec_mut::<cbc::cipher::block_padding::Pkcs7>(plaintext)
            }
            CipherAlgo::Aes256 => {
                Aes256CbcEnc::new(key.as_slice().into(), iv.as_slice().into())
                    .encrypt_padded_vec_mut::<cbc::cipher::block_padding::Pkcs7>(plaintext)
            }
        }
    }

    pub fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, String> {
        let key = self.key_bytes(key);
        let iv = self.iv();
        let result = match self {
            CipherAlgo::Blowfish => {
                BlowfishCbcDec::new(key.as_slice().into(), iv.as_slice().into())
                    .decrypt_padded_vec_mut::<cbc::cipher::block_padding::Pkcs7>(ciphertext)
            }
            CipherAlgo::Aes256 => {
                Aes256CbcDec::new(key.as_slice().into(), iv.as_slice().into())
                    .decrypt_padded_vec_mut::<cbc::cipher::block_padding::Pkcs7>(ciphertext)
            }
        };
        result.map_err(|e| e.to_string())
    }
}
