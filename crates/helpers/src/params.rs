// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Param coercion: object -> named args, array -> positional args,
//! scalar -> single positional arg.

use serde_json::Value;

use crate::error::HelperError;

#[derive(Debug, Clone)]
pub struct Params(Value);

impl Params {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a field by name (object form) or position (array/scalar
    /// form). `idx` is the positional slot this field would occupy when
    /// callers use the array form.
    pub fn field(&self, name: &str, idx: usize) -> Option<&Value> {
        match &self.0 {
            Value::Object(map) => map.get(name),
            Value::Array(items) => items.get(idx),
            Value::Null => None,
            scalar => {
                if idx == 0 {
                    Some(scalar)
                } else {
                    None
                }
            }
        }
    }

    pub fn required(&self, name: &str, idx: usize) -> Result<&Value, HelperError> {
        self.field(name, idx)
            .ok_or_else(|| HelperError::InvalidParams(format!("missing required param `{name}`")))
    }

    pub fn required_str(&self, name: &str, idx: usize) -> Result<String, HelperError> {
        match self.required(name, idx)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(HelperError::InvalidParams(format!(
                "param `{name}` must be a string, got {other}"
            ))),
        }
    }

    pub fn opt_str(&self, name: &str, idx: usize) -> Option<String> {
        match self.field(name, idx) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn opt_bool(&self, name: &str, idx: usize, default: bool) -> bool {
        match self.field(name, idx) {
            Some(Value::Bool(b)) => *b,
            _ => default,
        }
    }

    pub fn opt_array(&self, name: &str, idx: usize) -> Vec<Value> {
        match self.field(name, idx) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    pub fn opt_object(&self, name: &str, idx: usize) -> serde_json::Map<String, Value> {
        match self.field(name, idx) {
            Some(Value::Object(map)) => map.clone(),
            _ => serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_form_looks_up_by_name() {
        let p = Params::new(json!({"dsn": "x"}));
        assert_eq!(p.required_str("dsn", 0).unwrap(), "x");
    }

    #[test]
    fn array_form_looks_up_by_position() {
        let p = Params::new(json!(["x", "y"]));
        assert_eq!(p.required_str("dsn", 0).unwrap(), "x");
        assert_eq!(p.required_str("username", 1).unwrap(), "y");
    }

    #[test]
    fn scalar_form_is_positional_zero() {
        let p = Params::new(json!("only-arg"));
        assert_eq!(p.required_str("whatever", 0).unwrap(), "only-arg");
        assert!(p.field("whatever", 1).is_none());
    }

    #[test]
    fn missing_required_field_is_invalid_params() {
        let p = Params::new(json!({}));
        assert!(matches!(p.required("dsn", 0), Err(HelperError::InvalidParams(_))));
    }
}
