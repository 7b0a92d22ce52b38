// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Bind parameter model: positional `bind_values` vs. named/typed
//! `bind_params`, with the former taking precedence.

use serde_json::{Map, Value};

use super::error::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    fn parse(s: &str) -> Result<Self, DbError> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            "inout" => Ok(Direction::InOut),
            other => Err(DbError::InvalidParams(format!("invalid bind direction: {other}"))),
        }
    }

    pub fn allocates_output(&self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

/// The canonical bind type a caller's declared `type` (or, absent that,
/// the JSON value's own shape) coerces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindType {
    Null,
    Number,
    Varchar,
    Clob,
    Blob,
    Date,
    Timestamp,
    Other,
}

impl BindType {
    pub fn infer(value: &Value, type_hint: Option<&str>) -> BindType {
        if let Some(hint) = type_hint {
            return match hint.to_ascii_uppercase().as_str() {
                "NUMBER" | "INTEGER" | "INT" => BindType::Number,
                "VARCHAR" | "VARCHAR2" | "CHAR" | "STRING" => BindType::Varchar,
                "CLOB" => BindType::Clob,
                "BLOB" => BindType::Blob,
                "DATE" => BindType::Date,
                "TIMESTAMP" => BindType::Timestamp,
                _ => BindType::Other,
            };
        }
        match value {
            Value::Null => BindType::Null,
            Value::Number(_) => BindType::Number,
            Value::String(_) => BindType::Varchar,
            _ => BindType::Other,
        }
    }
}

/// One entry of the named/typed bind interface.
#[derive(Debug, Clone)]
pub struct NamedBind {
    pub value: Value,
    pub bind_type: BindType,
    pub direction: Direction,
    pub size: Option<usize>,
}

impl NamedBind {
    fn parse(raw: &Value) -> Result<Self, DbError> {
        let obj = raw
            .as_object()
            .ok_or_else(|| DbError::InvalidParams("bind_params entry must be an object".into()))?;
        let value = obj.get("value").cloned().unwrap_or(Value::Null);
        let type_hint = obj.get("type").and_then(Value::as_str);
        let direction = match obj.get("direction").and_then(Value::as_str) {
            Some(d) => Direction::parse(d)?,
            None => Direction::In,
        };
        let size = obj.get("size").and_then(Value::as_u64).map(|n| n as usize);
        let bind_type = BindType::infer(&value, type_hint);
        Ok(NamedBind { value, bind_type, direction, size })
    }
}

/// The effective bind set for one `execute_statement` call, already
/// resolved for precedence.
#[derive(Debug, Clone)]
pub enum Binds {
    Positional(Vec<Value>),
    /// Sorted by parameter name, giving a deterministic bind order.
    Named(Vec<(String, NamedBind)>),
}

impl Binds {
    pub fn is_empty(&self) -> bool {
        match self {
            Binds::Positional(v) => v.is_empty(),
            Binds::Named(v) => v.is_empty(),
        }
    }

    /// Bind values in driver order, ignoring names/types -- used by
    /// drivers (real or fake) that only need positional substitution.
    pub fn values(&self) -> Vec<Value> {
        match self {
            Binds::Positional(v) => v.clone(),
            Binds::Named(v) => v.iter().map(|(_, b)| b.value.clone()).collect(),
        }
    }

    /// Names of every bind with an output-capable direction, in the
    /// deterministic order used by [`Binds::Named`].
    pub fn out_param_names(&self) -> Vec<String> {
        match self {
            Binds::Positional(_) => Vec::new(),
            Binds::Named(v) => {
                v.iter().filter(|(_, b)| b.direction.allocates_output()).map(|(n, _)| n.clone()).collect()
            }
        }
    }
}

/// Resolve `bind_values`/`bind_params` per the precedence rule: a
/// non-empty `bind_values` array always wins.
pub fn resolve(bind_values: &[Value], bind_params: &Map<String, Value>) -> Result<Binds, DbError> {
    if !bind_values.is_empty() {
        return Ok(Binds::Positional(bind_values.to_vec()));
    }
    let mut entries: Vec<(String, NamedBind)> = bind_params
        .iter()
        .map(|(k, v)| NamedBind::parse(v).map(|b| (k.clone(), b)))
        .collect::<Result<_, DbError>>()?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(Binds::Named(entries))
}

#[cfg(test)]
#[path = "bind_tests.rs"]
mod tests;
