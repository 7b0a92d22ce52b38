// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! The database helper: the daemon's single hardest helper, modeling a
//! legacy database-access contract across two dialect families on top
//! of a native-driver seam (see [`driver`]).

mod bind;
mod cache;
mod connection;
mod dsn;
mod error;
mod driver;
mod informix_driver;
mod oracle_driver;
mod statement;

#[cfg(any(test, feature = "test-support"))]
pub mod fake_driver;

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::HelperError;
use crate::module::{HelperCtx, HelperModule};
use crate::params::Params;

use bind::Binds;
use cache::ConnectionCache;
use connection::{is_mutating_sql, ConnectionState};
use dsn::{resolve_auth_mode, AuthMode, DbFamily};
pub use error::DbError;
use statement::StatementState;

pub struct DbModule {
    cache: ConnectionCache,
}

impl DbModule {
    pub fn new() -> Self {
        Self { cache: ConnectionCache::new(Arc::new(hd_core::SystemClock)) }
    }
}

impl Default for DbModule {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
fn resolve_driver(_family: DbFamily) -> Box<dyn driver::DbDriver> {
    Box::new(fake_driver::FakeDriver)
}

#[cfg(not(any(test, feature = "test-support")))]
fn resolve_driver(family: DbFamily) -> Box<dyn driver::DbDriver> {
    match family {
        DbFamily::Oracle => Box::new(oracle_driver::OracleFamilyDriver),
        DbFamily::Informix => Box::new(informix_driver::InformixFamilyDriver),
    }
}

impl HelperModule for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    fn functions(&self) -> &'static [&'static str] {
        &[
            "connect",
            "connect_cached",
            "disconnect",
            "begin_transaction",
            "commit",
            "rollback",
            "prepare",
            "execute_statement",
            "execute_immediate",
            "fetch_row",
            "fetch_all",
            "finish_statement",
            "get_bind_value",
        ]
    }

    fn dispatch(&self, function: &str, params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
        let result = match function {
            "connect" => connect(params, ctx),
            "connect_cached" => connect_cached(params, ctx, &self.cache),
            "disconnect" => disconnect(params, ctx, &self.cache),
            "begin_transaction" => begin_transaction(params, ctx),
            "commit" => commit(params, ctx),
            "rollback" => rollback(params, ctx),
            "prepare" => prepare(params, ctx),
            "execute_statement" => execute_statement(params, ctx),
            "execute_immediate" => execute_immediate(params, ctx),
            "fetch_row" => fetch_row(params, ctx),
            "fetch_all" => fetch_all(params, ctx),
            "finish_statement" => finish_statement(params, ctx),
            "get_bind_value" => get_bind_value(params, ctx),
            other => return Err(HelperError::UnknownFunction(other.to_string())),
        };
        result.map_err(HelperError::from)
    }
}

fn resolve_requested_auth_mode(requested: &str) -> Result<AuthMode, DbError> {
    let krb5_config_set = std::env::var_os("KRB5_CONFIG").is_some();
    let krb5_ccname_set = std::env::var_os("KRB5CCNAME").is_some();
    resolve_auth_mode(requested, krb5_config_set, krb5_ccname_set)
}

fn connect(params: Params, ctx: &HelperCtx) -> Result<Value, DbError> {
    let dsn_str = params.required_str("dsn", 0).map_err(to_db_error)?;
    let username = params.opt_str("username", 1);
    let password = params.opt_str("password", 2);
    let options = params.opt_object("options", 3);
    let auth_mode_req = params.opt_str("auth_mode", 5).unwrap_or_else(|| "auto".to_string());

    let (conn_id, auth_mode) = open_connection(&dsn_str, username.as_deref(), password.as_deref(), &options, &auth_mode_req, ctx)?;
    Ok(json!({"connection_id": conn_id, "connected": true, "auth_mode": auth_mode.as_str()}))
}

fn connect_cached(params: Params, ctx: &HelperCtx, cache: &ConnectionCache) -> Result<Value, DbError> {
    let dsn_str = params.required_str("dsn", 0).map_err(to_db_error)?;
    let username = params.opt_str("username", 1);
    let password = params.opt_str("password", 2);
    let options = params.opt_object("options", 3);
    let explicit_cache_key = params.opt_str("cache_key", 4);

    let key = ConnectionCache::key_for(explicit_cache_key.as_deref(), &dsn_str, username.as_deref(), &options);

    if let Some(conn_id) = cache.get(&key) {
        if ctx.registry.get(&conn_id, Some(hd_registry::Kind::Conn)).is_ok() {
            return Ok(json!({"connection_id": conn_id, "connected": true}));
        }
    }

    let (conn_id, _auth_mode) = open_connection(&dsn_str, username.as_deref(), password.as_deref(), &options, "auto", ctx)?;
    if let Some(evicted) = cache.insert(key, conn_id.clone()) {
        ctx.registry.destroy(&evicted);
    }
    Ok(json!({"connection_id": conn_id, "connected": true}))
}

fn open_connection(
    dsn_str: &str,
    username: Option<&str>,
    password: Option<&str>,
    options: &Map<String, Value>,
    auth_mode_req: &str,
    ctx: &HelperCtx,
) -> Result<(String, AuthMode), DbError> {
    let parsed = dsn::parse(dsn_str)?;
    let auth_mode = resolve_requested_auth_mode(auth_mode_req)?;

    let autocommit = options.get("AutoCommit").and_then(Value::as_bool).unwrap_or(true);
    let raise_error = options.get("RaiseError").and_then(Value::as_bool).unwrap_or(false);
    let print_error = options.get("PrintError").and_then(Value::as_bool).unwrap_or(true);
    let connect_options = driver::ConnectOptions { autocommit, raise_error, print_error, driver_options: options.clone() };

    let native = resolve_driver(parsed.family).connect(&parsed, username, password, auth_mode, &connect_options)?;
    let state = ConnectionState::new(native, parsed.family, autocommit, raise_error, print_error);

    let conn_id = ctx.registry.create(
        hd_registry::Kind::Conn,
        Box::new(state),
        None,
        json!({
            "dsn": dsn_str,
            "username": username,
            "auth_mode": auth_mode.as_str(),
            "autocommit": autocommit,
            "raise_error": raise_error,
            "print_error": print_error,
        }),
    );
    Ok((conn_id, auth_mode))
}

/// Close the connection if `payload` is in fact a [`ConnectionState`].
/// Used both by `disconnect` and the registry's release hook, so a
/// connection the reaper evicts for idleness is actually closed rather
/// than merely forgotten.
pub(crate) fn release_connection(payload: &mut hd_registry::Payload) {
    if let Some(conn) = payload.downcast_mut::<ConnectionState>() {
        if let Err(e) = conn.close() {
            tracing::warn!(error = %e, "error closing connection during release");
        }
    }
}

/// Finish the statement if `payload` is in fact a [`StatementState`].
/// See [`release_connection`]; the same reasoning applies to a
/// statement the reaper evicts independently of its connection.
pub(crate) fn release_statement(payload: &mut hd_registry::Payload) {
    if let Some(stmt) = payload.downcast_mut::<StatementState>() {
        if let Err(e) = stmt.finish() {
            tracing::warn!(error = %e, "error finishing statement during release");
        }
    }
}

fn disconnect(params: Params, ctx: &HelperCtx, cache: &ConnectionCache) -> Result<Value, DbError> {
    let conn_id = params.required_str("connection_id", 0).map_err(to_db_error)?;
    if let Ok(entry) = ctx.registry.get(&conn_id, Some(hd_registry::Kind::Conn)) {
        entry.with_state(&**ctx.registry.clock(), |state| release_connection(&mut state.payload));
    }
    ctx.registry.destroy(&conn_id);
    cache.remove_by_conn_id(&conn_id);
    Ok(json!({"success": true}))
}

fn with_connection<R>(
    conn_id: &str,
    ctx: &HelperCtx,
    f: impl FnOnce(&mut ConnectionState) -> Result<R, DbError>,
) -> Result<R, DbError> {
    let entry = ctx.registry.get(conn_id, Some(hd_registry::Kind::Conn))?;
    entry.with_state(&**ctx.registry.clock(), |state| {
        let conn = state
            .payload
            .downcast_mut::<ConnectionState>()
            .ok_or_else(|| DbError::Internal("connection payload type mismatch".into()))?;
        f(conn)
    })
}

fn with_statement<R>(
    stmt_id: &str,
    ctx: &HelperCtx,
    f: impl FnOnce(&mut StatementState) -> Result<R, DbError>,
) -> Result<R, DbError> {
    let entry = ctx.registry.get(stmt_id, Some(hd_registry::Kind::Stmt))?;
    entry.with_state(&**ctx.registry.clock(), |state| {
        let stmt = state
            .payload
            .downcast_mut::<StatementState>()
            .ok_or_else(|| DbError::Internal("statement payload type mismatch".into()))?;
        f(stmt)
    })
}

fn begin_transaction(params: Params, ctx: &HelperCtx) -> Result<Value, DbError> {
    let conn_id = params.required_str("connection_id", 0).map_err(to_db_error)?;
    with_connection(&conn_id, ctx, |conn| conn.begin_transaction())?;
    Ok(json!({"success": true}))
}

fn commit(params: Params, ctx: &HelperCtx) -> Result<Value, DbError> {
    let conn_id = params.required_str("connection_id", 0).map_err(to_db_error)?;
    with_connection(&conn_id, ctx, |conn| conn.commit())?;
    Ok(json!({"success": true}))
}

fn rollback(params: Params, ctx: &HelperCtx) -> Result<Value, DbError> {
    let conn_id = params.required_str("connection_id", 0).map_err(to_db_error)?;
    with_connection(&conn_id, ctx, |conn| conn.rollback())?;
    Ok(json!({"success": true}))
}

fn prepare(params: Params, ctx: &HelperCtx) -> Result<Value, DbError> {
    let conn_id = params.required_str("connection_id", 0).map_err(to_db_error)?;
    let sql = params.required_str("sql", 1).map_err(to_db_error)?;

    let cursor = with_connection(&conn_id, ctx, |conn| conn.driver.prepare(&sql))?;
    let stmt = StatementState::new(cursor, sql);
    let stmt_id = ctx.registry.create(hd_registry::Kind::Stmt, Box::new(stmt), Some(conn_id), json!({}));
    Ok(json!({"statement_id": stmt_id}))
}

fn resolve_binds(params: &Params) -> Result<Binds, DbError> {
    let bind_values = params.opt_array("bind_values", 2);
    let bind_params = params.opt_object("bind_params", 3);
    bind::resolve(&bind_values, &bind_params)
}

fn execute_statement(params: Params, ctx: &HelperCtx) -> Result<Value, DbError> {
    let conn_id = params.required_str("connection_id", 0).map_err(to_db_error)?;
    let stmt_id = params.required_str("statement_id", 1).map_err(to_db_error)?;
    let binds = resolve_binds(&params)?;

    let sql = with_statement(&stmt_id, ctx, |stmt| Ok(stmt.sql.clone()))?;
    with_connection(&conn_id, ctx, |conn| conn.begin_implicit_if_needed(is_mutating_sql(&sql)))?;

    let (rows_affected, columns, out_params) = with_statement(&stmt_id, ctx, |stmt| {
        stmt.execute(&binds)?;
        Ok((stmt.rows_affected, stmt.columns.clone(), stmt.out_params()))
    })?;

    let mut response = json!({
        "rows_affected": rows_affected,
        "column_info": columns.map(|c| json!({
            "count": c.count(),
            "names": c.names,
            "types": c.types.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        })).unwrap_or(Value::Null),
    });
    if !out_params.is_empty() {
        response["out_params"] = json!(out_params);
    }
    Ok(response)
}

fn execute_immediate(params: Params, ctx: &HelperCtx) -> Result<Value, DbError> {
    let conn_id = params.required_str("connection_id", 0).map_err(to_db_error)?;
    let sql = params.required_str("sql", 1).map_err(to_db_error)?;
    let bind_values = params.opt_array("bind_values", 2);
    let binds = Binds::Positional(bind_values);

    with_connection(&conn_id, ctx, |conn| conn.begin_implicit_if_needed(is_mutating_sql(&sql)))?;

    let cursor = with_connection(&conn_id, ctx, |conn| conn.driver.prepare(&sql))?;
    let mut stmt = StatementState::new(cursor, sql);
    stmt.execute(&binds)?;
    let rows_affected = stmt.rows_affected;
    stmt.finish()?;
    Ok(json!({"rows_affected": rows_affected}))
}

fn row_to_value(row: Vec<Value>, names: &[String], format: &str) -> Value {
    if format == "hash" {
        let mut obj = Map::new();
        for (name, value) in names.iter().zip(row) {
            obj.insert(name.clone(), value);
        }
        Value::Object(obj)
    } else {
        Value::Array(row)
    }
}

fn fetch_row(params: Params, ctx: &HelperCtx) -> Result<Value, DbError> {
    let stmt_id = params.required_str("statement_id", 1).map_err(to_db_error)?;
    let format = params.opt_str("format", 2).unwrap_or_else(|| "array".to_string());

    let (row, names) = with_statement(&stmt_id, ctx, |stmt| {
        let names = stmt.columns.as_ref().map(|c| c.names.clone()).unwrap_or_default();
        Ok((stmt.fetch_row()?, names))
    })?;

    Ok(json!({"row": row.map(|r| row_to_value(r, &names, &format)).unwrap_or(Value::Null)}))
}

fn fetch_all(params: Params, ctx: &HelperCtx) -> Result<Value, DbError> {
    let stmt_id = params.required_str("statement_id", 1).map_err(to_db_error)?;
    let format = params.opt_str("format", 2).unwrap_or_else(|| "array".to_string());

    let (rows, names) = with_statement(&stmt_id, ctx, |stmt| {
        let names = stmt.columns.as_ref().map(|c| c.names.clone()).unwrap_or_default();
        Ok((stmt.fetch_all()?, names))
    })?;

    let rows: Vec<Value> = rows.into_iter().map(|r| row_to_value(r, &names, &format)).collect();
    Ok(json!({"rows": rows}))
}

fn finish_statement(params: Params, ctx: &HelperCtx) -> Result<Value, DbError> {
    let stmt_id = params.required_str("statement_id", 1).map_err(to_db_error)?;
    if let Ok(entry) = ctx.registry.get(&stmt_id, Some(hd_registry::Kind::Stmt)) {
        entry.with_state(&**ctx.registry.clock(), |state| release_statement(&mut state.payload));
    }
    ctx.registry.destroy(&stmt_id);
    Ok(json!({"success": true}))
}

fn get_bind_value(params: Params, ctx: &HelperCtx) -> Result<Value, DbError> {
    let stmt_id = params.required_str("statement_id", 0).map_err(to_db_error)?;
    let name = params.required_str("name", 1).map_err(to_db_error)?;
    let value = with_statement(&stmt_id, ctx, |stmt| Ok(stmt.out_params().get(&name).cloned()))?;
    Ok(json!({"value": value.unwrap_or(Value::Null)}))
}

fn to_db_error(e: HelperError) -> DbError {
    match e {
        HelperError::InvalidParams(m) => DbError::InvalidParams(m),
        other => DbError::Internal(other.to_string()),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
