// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Database helper error taxonomy, mapped to the shared [`HelperError`]
//! only at the module boundary -- `db`'s own functions never return a
//! bare `String`.

use thiserror::Error;

use crate::error::HelperError;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("{0}")]
    State(String),

    #[error("{0}")]
    Driver(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DbError> for HelperError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::InvalidParams(m) => HelperError::InvalidParams(m),
            DbError::State(m) => HelperError::StateError(m),
            DbError::Driver(m) => HelperError::DriverError(m),
            DbError::NotFound(m) => HelperError::NotFound(m),
            DbError::Internal(m) => HelperError::Internal(m),
        }
    }
}

impl From<hd_registry::RegistryError> for DbError {
    fn from(e: hd_registry::RegistryError) -> Self {
        match e {
            hd_registry::RegistryError::NotFound(id) => DbError::NotFound(id),
        }
    }
}
