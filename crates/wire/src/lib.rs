// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! IPC protocol for the legacy helper daemon.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod envelope;

pub use codec::{
    decode, encode, read_message, read_request, write_message, write_response, ProtocolError,
    DEFAULT_MAX_REQUEST_BYTES,
};
pub use envelope::{Request, Response};

#[cfg(test)]
mod property_tests;
