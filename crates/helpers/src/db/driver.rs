// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! The native-driver seam: connection and statement lifecycle, bind
//! handling, and fetch semantics are real and fully tested against this
//! trait; only the actual wire-level call to a native client library
//! sits behind it.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::bind::Binds;
use super::dsn::{AuthMode, ParsedDsn};
use super::error::DbError;

/// Canonical column type set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Number,
    String,
    Clob,
    Blob,
    Date,
    Timestamp,
    Other,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Number => "number",
            ColumnType::String => "string",
            ColumnType::Clob => "clob",
            ColumnType::Blob => "blob",
            ColumnType::Date => "date",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Other => "other",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub names: Vec<String>,
    pub types: Vec<ColumnType>,
}

impl ColumnInfo {
    pub fn count(&self) -> usize {
        self.names.len()
    }
}

/// Result of a single `execute` call on a cursor.
///
/// `rows_affected` is `-1` for "unknown" (a streaming `SELECT`, where
/// the driver reports no row count up front) and a real, distinct `0`
/// for a DML statement that genuinely touched no rows; the two are
/// never conflated.
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub rows_affected: i64,
    pub columns: Option<ColumnInfo>,
}

/// Per-connection options recognized at `connect`.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub autocommit: bool,
    pub raise_error: bool,
    pub print_error: bool,
    /// Opaque per-driver options, passed through unexamined.
    pub driver_options: serde_json::Map<String, Value>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self { autocommit: true, raise_error: false, print_error: true, driver_options: Default::default() }
    }
}

/// One dialect family's driver: turns a parsed DSN into a live
/// connection. `OracleFamilyDriver` and `InformixFamilyDriver` are the
/// two real implementations; `FakeDriver` stands in for both in tests.
pub trait DbDriver: Send + Sync {
    fn connect(
        &self,
        dsn: &ParsedDsn,
        username: Option<&str>,
        password: Option<&str>,
        auth_mode: AuthMode,
        options: &ConnectOptions,
    ) -> Result<Box<dyn DbConnection>, DbError>;
}

pub trait DbConnection: Send {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn DbCursor>, DbError>;
    fn begin(&mut self) -> Result<(), DbError>;
    fn commit(&mut self) -> Result<(), DbError>;
    fn rollback(&mut self) -> Result<(), DbError>;
    fn close(&mut self) -> Result<(), DbError>;
}

pub trait DbCursor: Send {
    fn execute(&mut self, binds: &Binds) -> Result<ExecResult, DbError>;

    /// Advance and return one raw row in driver column order, or `None`
    /// at end of result set.
    fn fetch_one(&mut self) -> Result<Option<Vec<Value>>, DbError>;

    /// Values bound with an `out`/`inout` direction, populated once
    /// `execute` has run.
    fn out_params(&self) -> BTreeMap<String, Value>;

    fn close(&mut self) -> Result<(), DbError>;
}
