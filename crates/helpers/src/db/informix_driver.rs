// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Informix-family driver, backed by `odbc-api` -- there is no
//! maintained native-protocol Informix crate, so this dialect family
//! goes through the IBM Informix ODBC driver instead, same as the host
//! process's own legacy access path.
//!
//! One process-wide `odbc_api::Environment` is required by the ODBC API
//! and lives for the life of the daemon (`OnceLock`), so a `Connection`
//! borrowed from it is effectively `'static` and can be shared (behind a
//! mutex) with the cursors prepared from it. As in
//! [`super::oracle_driver`], a cursor runs its statement to completion in
//! `execute` and buffers the rows, rather than keeping a live
//! `CursorImpl` borrow of the connection between RPC calls.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock};

use odbc_api::buffers::TextRowSet;
use odbc_api::parameter::VarCharBox;
use odbc_api::{ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use serde_json::Value;

use super::bind::Binds;
use super::driver::{ColumnInfo, ColumnType, ConnectOptions, DbConnection, DbCursor, DbDriver, ExecResult};
use super::dsn::{AuthMode, ParsedDsn};
use super::error::DbError;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment, DbError> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(|e| DbError::Driver(e.to_string()))?;
    Ok(ENVIRONMENT.get_or_init(|| env))
}

pub struct InformixFamilyDriver;

impl DbDriver for InformixFamilyDriver {
    fn connect(
        &self,
        dsn: &ParsedDsn,
        username: Option<&str>,
        password: Option<&str>,
        auth_mode: AuthMode,
        _options: &ConnectOptions,
    ) -> Result<Box<dyn DbConnection>, DbError> {
        if matches!(auth_mode, AuthMode::Password) && username.is_none() {
            return Err(DbError::InvalidParams("password auth requires username".into()));
        }

        let env = environment()?;
        let conn = env
            .connect(&dsn.connect_string, username.unwrap_or(""), password.unwrap_or(""), ConnectionOptions::default())
            .map_err(|e| DbError::Driver(e.to_string()))?;
        Ok(Box::new(InformixConnection { conn: Arc::new(Mutex::new(conn)) }))
    }
}

struct InformixConnection {
    conn: Arc<Mutex<odbc_api::Connection<'static>>>,
}

impl InformixConnection {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, odbc_api::Connection<'static>>, DbError> {
        self.conn.lock().map_err(|_| DbError::Internal("informix connection mutex poisoned".into()))
    }
}

impl DbConnection for InformixConnection {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn DbCursor>, DbError> {
        Ok(Box::new(InformixCursor {
            conn: self.conn.clone(),
            sql: sql.to_string(),
            rows: VecDeque::new(),
            out_params: BTreeMap::new(),
        }))
    }

    fn begin(&mut self) -> Result<(), DbError> {
        self.lock()?.set_autocommit(false).map_err(|e| DbError::Driver(e.to_string()))
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.lock()?.commit().map_err(|e| DbError::Driver(e.to_string()))
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.lock()?.rollback().map_err(|e| DbError::Driver(e.to_string()))
    }

    fn close(&mut self) -> Result<(), DbError> {
        // `odbc_api::Connection` disconnects on drop; nothing to do
        // explicitly beyond letting the registry drop the payload.
        Ok(())
    }
}

struct InformixCursor {
    conn: Arc<Mutex<odbc_api::Connection<'static>>>,
    sql: String,
    rows: VecDeque<Vec<Value>>,
    out_params: BTreeMap<String, Value>,
}

impl DbCursor for InformixCursor {
    fn execute(&mut self, binds: &Binds) -> Result<ExecResult, DbError> {
        self.rows.clear();
        self.out_params.clear();

        let values = binds.values().iter().map(json_to_string_bind).collect::<Result<Vec<_>, _>>()?;
        let params: Vec<VarCharBox> = values.into_iter().map(VarCharBox::from_opt_string).collect();

        let conn = self.conn.lock().map_err(|_| DbError::Internal("informix connection mutex poisoned".into()))?;
        let maybe_cursor =
            conn.execute(&self.sql, params.as_slice(), None).map_err(|e| DbError::Driver(e.to_string()))?;

        let Some(mut cursor) = maybe_cursor else {
            return Ok(ExecResult { rows_affected: 1, columns: None });
        };

        let num_cols = cursor.num_result_cols().map_err(|e| DbError::Driver(e.to_string()))? as usize;
        let mut names = Vec::with_capacity(num_cols);
        for i in 1..=num_cols {
            let mut buf = Vec::new();
            cursor.col_name(i as u16, &mut buf).map_err(|e| DbError::Driver(e.to_string()))?;
            names.push(String::from_utf8_lossy(&buf).to_string());
        }
        let types = vec![ColumnType::Other; num_cols];

        let mut row_set_buffer =
            TextRowSet::for_cursor(256, &mut cursor, Some(4096)).map_err(|e| DbError::Driver(e.to_string()))?;
        let mut row_set_cursor =
            cursor.bind_buffer(&mut row_set_buffer).map_err(|e| DbError::Driver(e.to_string()))?;

        while let Some(batch) = row_set_cursor.fetch().map_err(|e| DbError::Driver(e.to_string()))? {
            for row_index in 0..batch.num_rows() {
                let mut row = Vec::with_capacity(num_cols);
                for col_index in 0..num_cols {
                    let cell = batch.at(col_index, row_index);
                    row.push(
                        cell.map(|bytes| Value::from(String::from_utf8_lossy(bytes).to_string()))
                            .unwrap_or(Value::Null),
                    );
                }
                self.rows.push_back(row);
            }
        }

        Ok(ExecResult { rows_affected: -1, columns: Some(ColumnInfo { names, types }) })
    }

    fn fetch_one(&mut self) -> Result<Option<Vec<Value>>, DbError> {
        Ok(self.rows.pop_front())
    }

    fn out_params(&self) -> BTreeMap<String, Value> {
        self.out_params.clone()
    }

    fn close(&mut self) -> Result<(), DbError> {
        self.rows.clear();
        Ok(())
    }
}

fn json_to_string_bind(value: &Value) -> Result<Option<String>, DbError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(if *b { "1".to_string() } else { "0".to_string() })),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(DbError::Driver(format!("unsupported bind value: {other}"))),
    }
}
