// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! The wire-level error taxonomy shared by every layer of the daemon.
//!
//! Internal crates define their own `thiserror` error enums and convert
//! into [`ErrorKind`] only at the dispatcher boundary — no crate-internal
//! error type crosses the wire directly.

use serde::{Deserialize, Serialize};

/// Machine-readable discriminant carried in `Response::Err { error_kind, .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    UnknownModule,
    UnknownFunction,
    InvalidParams,
    NotFound,
    DriverError,
    StateError,
    Timeout,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::UnknownModule => "unknown_module",
            ErrorKind::UnknownFunction => "unknown_function",
            ErrorKind::InvalidParams => "invalid_params",
            ErrorKind::NotFound => "not_found",
            ErrorKind::DriverError => "driver_error",
            ErrorKind::StateError => "state_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
