// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Date/time helper: stateless, so it never touches the registry. A
//! thin, chrono-backed stand-in for the legacy date-arithmetic library
//! this daemon offloads: every call is pure, taking its inputs and
//! returning its output with no resource id.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde_json::{json, Value};

use crate::error::HelperError;
use crate::module::{HelperCtx, HelperModule};
use crate::params::Params;

pub struct DatetimeModule;

impl HelperModule for DatetimeModule {
    fn name(&self) -> &'static str {
        "datetime"
    }

    fn functions(&self) -> &'static [&'static str] {
        &["now", "parse", "format", "add_seconds", "diff_seconds"]
    }

    fn dispatch(&self, function: &str, params: Params, _ctx: &HelperCtx) -> Result<Value, HelperError> {
        match function {
            "now" => now(params),
            "parse" => parse(params),
            "format" => format(params),
            "add_seconds" => add_seconds(params),
            "diff_seconds" => diff_seconds(params),
            other => Err(HelperError::UnknownFunction(other.to_string())),
        }
    }
}

const DEFAULT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

fn now(params: Params) -> Result<Value, HelperError> {
    let fmt = params.opt_str("format", 0).unwrap_or_else(|| DEFAULT_FORMAT.to_string());
    Ok(json!({"formatted": Utc::now().format(&fmt).to_string(), "epoch_seconds": Utc::now().timestamp()}))
}

fn parse_input(params: &Params) -> Result<DateTime<Utc>, HelperError> {
    let input = params.required_str("value", 0)?;
    let fmt = params.opt_str("format", 1).unwrap_or_else(|| DEFAULT_FORMAT.to_string());
    let naive = NaiveDateTime::parse_from_str(&input, &fmt)
        .map_err(|e| HelperError::InvalidParams(format!("`{input}` does not match format `{fmt}`: {e}")))?;
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

fn parse(params: Params) -> Result<Value, HelperError> {
    let parsed = parse_input(&params)?;
    Ok(json!({"epoch_seconds": parsed.timestamp()}))
}

fn format(params: Params) -> Result<Value, HelperError> {
    let epoch = params.required("value", 0)?.as_i64().ok_or_else(|| HelperError::InvalidParams("value must be an integer epoch".into()))?;
    let fmt = params.opt_str("format", 1).unwrap_or_else(|| DEFAULT_FORMAT.to_string());
    let dt = DateTime::<Utc>::from_timestamp(epoch, 0)
        .ok_or_else(|| HelperError::InvalidParams(format!("{epoch} is not a valid epoch second")))?;
    Ok(json!({"formatted": dt.format(&fmt).to_string()}))
}

fn add_seconds(params: Params) -> Result<Value, HelperError> {
    let epoch = params.required("value", 0)?.as_i64().ok_or_else(|| HelperError::InvalidParams("value must be an integer epoch".into()))?;
    let delta = params.required("seconds", 1)?.as_i64().ok_or_else(|| HelperError::InvalidParams("seconds must be an integer".into()))?;
    let dt = DateTime::<Utc>::from_timestamp(epoch, 0)
        .ok_or_else(|| HelperError::InvalidParams(format!("{epoch} is not a valid epoch second")))?;
    Ok(json!({"epoch_seconds": (dt + Duration::seconds(delta)).timestamp()}))
}

fn diff_seconds(params: Params) -> Result<Value, HelperError> {
    let a = params.required("from", 0)?.as_i64().ok_or_else(|| HelperError::InvalidParams("from must be an integer epoch".into()))?;
    let b = params.required("to", 1)?.as_i64().ok_or_else(|| HelperError::InvalidParams("to must be an integer epoch".into()))?;
    Ok(json!({"diff_seconds": b - a}))
}

#[cfg(test)]
#[path = "datetime_tests.rs"]
mod tests;
