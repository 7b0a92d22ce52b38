// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Connection resource payload and lifecycle.

use tracing::warn;

use super::driver::DbConnection;
use super::dsn::DbFamily;
use super::error::DbError;

/// The native handle stored in the registry for a `conn_*` resource.
///
/// `autocommit`/`in_txn` are the only two bits of transaction state the
/// daemon itself tracks; everything else about "is this connection
/// usable" is delegated to the driver.
pub struct ConnectionState {
    pub driver: Box<dyn DbConnection>,
    pub family: DbFamily,
    pub autocommit: bool,
    pub raise_error: bool,
    pub print_error: bool,
    pub in_txn: bool,
}

impl ConnectionState {
    pub fn new(driver: Box<dyn DbConnection>, family: DbFamily, autocommit: bool, raise_error: bool, print_error: bool) -> Self {
        Self { driver, family, autocommit, raise_error, print_error, in_txn: false }
    }

    /// `begin_transaction` while already `IN_TXN` returns `state_error`
    /// rather than starting a nested transaction.
    pub fn begin_transaction(&mut self) -> Result<(), DbError> {
        if self.in_txn {
            return Err(DbError::State("transaction already in progress".into()));
        }
        self.driver.begin()?;
        self.in_txn = true;
        self.autocommit = false;
        Ok(())
    }

    /// Implicit transaction start ahead of the first mutating statement
    /// when `AutoCommit=false`. Distinct from `begin_transaction` only in
    /// that it is silent -- the client never asked for a transaction, the
    /// option did.
    pub fn begin_implicit_if_needed(&mut self, statement_is_mutating: bool) -> Result<(), DbError> {
        if statement_is_mutating && !self.autocommit && !self.in_txn {
            self.driver.begin()?;
            self.in_txn = true;
        }
        Ok(())
    }

    /// `commit`/`rollback` with no open transaction succeed as no-ops
    /// only under `autocommit=true`. Under manual commit, calling either
    /// with no transaction in progress is a `state_error`.
    pub fn commit(&mut self) -> Result<(), DbError> {
        if !self.in_txn {
            return if self.autocommit {
                Ok(())
            } else {
                Err(DbError::State("commit with no transaction in progress".into()))
            };
        }
        self.driver.commit()?;
        self.in_txn = false;
        Ok(())
    }

    pub fn rollback(&mut self) -> Result<(), DbError> {
        if !self.in_txn {
            return if self.autocommit {
                Ok(())
            } else {
                Err(DbError::State("rollback with no transaction in progress".into()))
            };
        }
        self.driver.rollback()?;
        self.in_txn = false;
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), DbError> {
        if self.in_txn {
            if let Err(e) = self.driver.rollback() {
                warn!(error = %e, "rollback during connection close failed");
            }
            self.in_txn = false;
        }
        self.driver.close()
    }
}

/// A SQL statement is "mutating" (participates in the implicit
/// transaction started by `AutoCommit=false`) whenever it is anything
/// other than a `SELECT`. This is the same sniff the fake driver uses
/// to decide whether it returns a result set.
pub fn is_mutating_sql(sql: &str) -> bool {
    !sql.trim_start().to_ascii_uppercase().starts_with("SELECT")
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
