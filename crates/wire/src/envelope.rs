// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Request/response envelope types.

use hd_core::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level request envelope sent by the host process.
///
/// `params` defaults to an empty object when omitted. `request_id` is
/// opaque to the daemon and echoed back unchanged so the caller can
/// correlate replies on a connection that may be reused for pipelining
/// by a future client (today each connection carries exactly one
/// request/response pair).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub module: String,
    pub function: String,
    #[serde(default = "default_params")]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

fn default_params() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Request {
    pub fn new(module: impl Into<String>, function: impl Into<String>, params: Value) -> Self {
        Self { module: module.into(), function: function.into(), params, request_id: None }
    }
}

/// Top-level response envelope.
///
/// `success` is always present. On success, `result` carries the helper's
/// JSON payload; on failure, `error`/`error_kind` carry the machine- and
/// human-readable failure description. The two shapes are mutually
/// exclusive but modeled as one struct (rather than an untagged enum) so
/// callers get a stable `success` field regardless of serde field order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Response {
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            module: None,
            function: None,
            error: None,
            error_kind: None,
            request_id: None,
        }
    }

    pub fn ok_from(module: &str, function: &str, result: Value) -> Self {
        let mut resp = Self::ok(result);
        resp.module = Some(module.to_string());
        resp.function = Some(function.to_string());
        resp
    }

    pub fn err(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            success: false,
            result: None,
            module: None,
            function: None,
            error: Some(message.into()),
            error_kind: Some(kind),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
