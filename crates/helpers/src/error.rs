// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! The helper-level error taxonomy, mapped to the wire [`ErrorKind`]
//! only at the dispatcher boundary.

use hd_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HelperError {
    #[error("unknown module: {0}")]
    UnknownModule(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    DriverError(String),

    #[error("{0}")]
    StateError(String),

    #[error("timed out")]
    Timeout,

    #[error("internal error: {0}")]
    Internal(String),
}

impl HelperError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HelperError::UnknownModule(_) => ErrorKind::UnknownModule,
            HelperError::UnknownFunction(_) => ErrorKind::UnknownFunction,
            HelperError::InvalidParams(_) => ErrorKind::InvalidParams,
            HelperError::NotFound(_) => ErrorKind::NotFound,
            HelperError::DriverError(_) => ErrorKind::DriverError,
            HelperError::StateError(_) => ErrorKind::StateError,
            HelperError::Timeout => ErrorKind::Timeout,
            HelperError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<hd_registry::RegistryError> for HelperError {
    fn from(e: hd_registry::RegistryError) -> Self {
        match e {
            hd_registry::RegistryError::NotFound(id) => HelperError::NotFound(id),
        }
    }
}
