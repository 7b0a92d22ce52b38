// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Oracle-family driver, backed by the `oracle` crate (OCI bindings).
//! Connection/statement lifecycle and bind/fetch semantics live in
//! [`super::connection`]/[`super::statement`]; this file only turns
//! those calls into real OCI calls.
//!
//! `oracle::Statement<'conn>` borrows its parent `Connection`, which
//! doesn't fit a `Box<dyn DbCursor + 'static>` held inside a registry
//! entry alongside its own connection entry. Rather than thread that
//! borrow through the registry's `Any` payload, a cursor here runs its
//! statement to completion inside `execute` and holds the already
//! materialized rows -- the registry-level peek/fetch semantics are
//! served from memory instead of a live server-side cursor.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use oracle::sql_type::OracleType;
use oracle::Connection;
use serde_json::Value;

use super::bind::Binds;
use super::driver::{ColumnInfo, ColumnType, ConnectOptions, DbConnection, DbCursor, DbDriver, ExecResult};
use super::dsn::{AuthMode, ParsedDsn};
use super::error::DbError;

pub struct OracleFamilyDriver;

impl DbDriver for OracleFamilyDriver {
    fn connect(
        &self,
        dsn: &ParsedDsn,
        username: Option<&str>,
        password: Option<&str>,
        auth_mode: AuthMode,
        _options: &ConnectOptions,
    ) -> Result<Box<dyn DbConnection>, DbError> {
        let username = match auth_mode {
            AuthMode::Password => {
                username.ok_or_else(|| DbError::InvalidParams("password auth requires username".into()))?
            }
            AuthMode::Kerberos => username.unwrap_or(""),
        };
        let password = password.unwrap_or("");

        let conn = Connection::connect(username, password, &dsn.connect_string)
            .map_err(|e| DbError::Driver(e.to_string()))?;
        Ok(Box::new(OracleConnection { conn: Arc::new(Mutex::new(conn)) }))
    }
}

struct OracleConnection {
    conn: Arc<Mutex<Connection>>,
}

impl DbConnection for OracleConnection {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn DbCursor>, DbError> {
        Ok(Box::new(OracleCursor {
            conn: self.conn.clone(),
            sql: sql.to_string(),
            rows: VecDeque::new(),
            out_params: BTreeMap::new(),
        }))
    }

    fn begin(&mut self) -> Result<(), DbError> {
        // Oracle sessions are always implicitly "in a transaction"; there
        // is no explicit BEGIN beyond the daemon's own autocommit flag.
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.lock()?.commit().map_err(|e| DbError::Driver(e.to_string()))
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.lock()?.rollback().map_err(|e| DbError::Driver(e.to_string()))
    }

    fn close(&mut self) -> Result<(), DbError> {
        self.lock()?.close().map_err(|e| DbError::Driver(e.to_string()))
    }
}

impl OracleConnection {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::Internal("oracle connection mutex poisoned".into()))
    }
}

struct OracleCursor {
    conn: Arc<Mutex<Connection>>,
    sql: String,
    rows: VecDeque<Vec<Value>>,
    out_params: BTreeMap<String, Value>,
}

impl DbCursor for OracleCursor {
    fn execute(&mut self, binds: &Binds) -> Result<ExecResult, DbError> {
        self.rows.clear();
        self.out_params.clear();

        let conn = self.conn.lock().map_err(|_| DbError::Internal("oracle connection mutex poisoned".into()))?;
        let mut stmt = conn.statement(&self.sql).build().map_err(|e| DbError::Driver(e.to_string()))?;

        match binds {
            Binds::Positional(values) => {
                let sql_values: Vec<String> = values.iter().map(json_to_string_bind).collect::<Result<_, _>>()?;
                let refs: Vec<&dyn oracle::sql_type::ToSql> = sql_values.iter().map(|v| v as _).collect();
                stmt.execute(&refs).map_err(|e| DbError::Driver(e.to_string()))?;
            }
            Binds::Named(entries) => {
                for (name, bind) in entries {
                    let sql_value = json_to_string_bind(&bind.value)?;
                    stmt.bind(name.as_str(), &sql_value).map_err(|e| DbError::Driver(e.to_string()))?;
                }
                stmt.execute(&[]).map_err(|e| DbError::Driver(e.to_string()))?;
                for (name, bind) in entries {
                    if bind.direction.allocates_output() {
                        let value: Result<Option<String>, _> = stmt.bind_value(name.as_str());
                        self.out_params.insert(name.clone(), value.ok().flatten().map(Value::from).unwrap_or(Value::Null));
                    }
                }
            }
        }

        let columns: Vec<(String, ColumnType)> = stmt
            .column_info()
            .iter()
            .map(|c| (c.name().to_string(), map_oracle_type(c.oracle_type())))
            .collect();

        if columns.is_empty() {
            return Ok(ExecResult { rows_affected: stmt.row_count().unwrap_or(0) as i64, columns: None });
        }

        while let Some(row) = stmt.next() {
            let row = row.map_err(|e| DbError::Driver(e.to_string()))?;
            let mut values = Vec::with_capacity(row.sql_values().len());
            for sql_value in row.sql_values() {
                let s: Option<String> = sql_value.get().map_err(|e| DbError::Driver(e.to_string()))?;
                values.push(s.map(Value::from).unwrap_or(Value::Null));
            }
            self.rows.push_back(values);
        }

        let names = columns.iter().map(|(n, _)| n.clone()).collect();
        let types = columns.iter().map(|(_, t)| *t).collect();
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

fn json_to_string_bind(value: &Value) -> Result<String, DbError> {
    // A deliberately narrow mapping -- enough for the scalar types this
    // bind model actually names (NULL/NUMBER/VARCHAR); CLOB/BLOB binds
    // go through driver-specific LOB APIs this seam does not cover.
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(if *b { "1".to_string() } else { "0".to_string() }),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        other => Err(DbError::Driver(format!("unsupported bind value: {other}"))),
    }
}

fn map_oracle_type(t: &OracleType) -> ColumnType {
    match t {
        OracleType::Varchar2(_) | OracleType::NVarchar2(_) | OracleType::Char(_) => ColumnType::String,
        OracleType::Number(_, _) | OracleType::Int64 | OracleType::UInt64 | OracleType::Float(_) => {
            ColumnType::Number
        }
        OracleType::Date => ColumnType::Date,
        OracleType::Timestamp(_) | OracleType::TimestampTZ(_) => ColumnType::Timestamp,
        OracleType::CLOB | OracleType::NCLOB => ColumnType::Clob,
        OracleType::BLOB => ColumnType::Blob,
        _ => ColumnType::Other,
    }
}
