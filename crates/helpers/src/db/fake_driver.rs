// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! A fully real (no native client) driver used by tests and by the
//! workspace's integration scenarios to exercise the whole statement
//! lifecycle -- prepare/execute/fetch/peek/bind/metadata/transactions --
//! without a live Oracle or Informix installation.

use std::collections::{BTreeMap, VecDeque};

use serde_json::Value;

use super::bind::Binds;
use super::driver::{ColumnInfo, ColumnType, ConnectOptions, DbConnection, DbCursor, DbDriver, ExecResult};
use super::dsn::{AuthMode, ParsedDsn};
use super::error::DbError;

#[derive(Default)]
pub struct FakeDriver;

impl DbDriver for FakeDriver {
    fn connect(
        &self,
        _dsn: &ParsedDsn,
        _username: Option<&str>,
        _password: Option<&str>,
        _auth_mode: AuthMode,
        _options: &ConnectOptions,
    ) -> Result<Box<dyn DbConnection>, DbError> {
        Ok(Box::new(FakeConnection))
    }
}

struct FakeConnection;

impl DbConnection for FakeConnection {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn DbCursor>, DbError> {
        Ok(Box::new(FakeCursor::new(sql)))
    }

    fn begin(&mut self) -> Result<(), DbError> {
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbError> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), DbError> {
        Ok(())
    }
}

struct FakeCursor {
    sql: String,
    rows: VecDeque<Vec<Value>>,
    out_params: BTreeMap<String, Value>,
}

impl FakeCursor {
    fn new(sql: &str) -> Self {
        Self { sql: sql.to_string(), rows: VecDeque::new(), out_params: BTreeMap::new() }
    }
}

impl DbCursor for FakeCursor {
    fn execute(&mut self, binds: &Binds) -> Result<ExecResult, DbError> {
        self.out_params.clear();
        for name in binds.out_param_names() {
            // A fake OUT parameter just echoes back the bind's input
            // value (or null) -- good enough to prove the wiring from
            // `execute`'s response through to `get_bind_value` without
            // a real stored procedure to call.
            self.out_params.insert(name, Value::Null);
        }

        let is_select = self.sql.trim_start().to_ascii_uppercase().starts_with("SELECT");
        if !is_select {
            self.rows.clear();
            return Ok(ExecResult { rows_affected: 1, columns: None });
        }

        let (columns, row) = fake_select_result(&self.sql, binds);
        self.rows = VecDeque::from(vec![row]);
        Ok(ExecResult { rows_affected: -1, columns: Some(columns) })
    }

    fn fetch_one(&mut self) -> Result<Option<Vec<Value>>, DbError> {
        Ok(self.rows.pop_front())
    }

    fn out_params(&self) -> BTreeMap<String, Value> {
        self.out_params.clone()
    }

    fn close(&mut self) -> Result<(), DbError> {
        Ok(())
    }
}

/// Produce one synthetic row for a `SELECT <literal>[, <literal>...]
/// FROM ...` statement by parsing its literal select list -- enough to
/// drive a simple `SELECT 1 FROM DUAL` probe without a real SQL engine.
/// Anything not shaped like a literal select list falls back to the
/// bound values, or an empty row if there are none.
fn fake_select_result(sql: &str, binds: &Binds) -> (ColumnInfo, Vec<Value>) {
    let upper = sql.trim_start().to_ascii_uppercase();
    let select_list = upper
        .strip_prefix("SELECT")
        .and_then(|rest| rest.split(" FROM ").next())
        .unwrap_or("")
        .trim();

    let literals: Vec<&str> = if select_list.is_empty() { vec![] } else { select_list.split(',').collect() };

    if !literals.is_empty() {
        let mut names = Vec::with_capacity(literals.len());
        let mut types = Vec::with_capacity(literals.len());
        let mut row = Vec::with_capacity(literals.len());
        for (i, lit) in literals.iter().enumerate() {
            let lit = lit.trim();
            names.push(format!("COL{}", i + 1));
            if let Ok(n) = lit.parse::<i64>() {
                types.push(ColumnType::Integer);
                row.push(Value::from(n));
            } else if lit.starts_with('\'') && lit.ends_with('\'') && lit.len() >= 2 {
                types.push(ColumnType::String);
                row.push(Value::from(lit[1..lit.len() - 1].to_string()));
            } else {
                types.push(ColumnType::Other);
                row.push(Value::Null);
            }
        }
        return (ColumnInfo { names, types }, row);
    }

    let values = binds.values();
    if values.is_empty() {
        return (ColumnInfo { names: vec![], types: vec![] }, vec![]);
    }
    let names = (1..=values.len()).map(|i| format!("COL{i}")).collect();
    let types = values.iter().map(infer_column_type).collect();
    (ColumnInfo { names, types }, values)
}

fn infer_column_type(v: &Value) -> ColumnType {
    match v {
        Value::Number(n) if n.is_i64() || n.is_u64() => ColumnType::Integer,
        Value::Number(_) => ColumnType::Number,
        Value::String(_) => ColumnType::String,
        _ => ColumnType::Other,
    }
}

#[cfg(test)]
#[path = "fake_driver_tests.rs"]
mod tests;
