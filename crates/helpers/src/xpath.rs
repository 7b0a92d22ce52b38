// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! XML/XPath helper, following the same registry contract as the other
//! resource-backed helpers: parse a document once,
//! keep it registered by id, and run repeated XPath queries against it
//! without re-parsing.

use serde_json::{json, Value};
use sxd_document::parser;
use sxd_document::Package;
use sxd_xpath::Value as XPathValue;

use crate::error::HelperError;
use crate::module::{HelperCtx, HelperModule};
use crate::params::Params;

pub struct XPathModule;

impl HelperModule for XPathModule {
    fn name(&self) -> &'static str {
        "xpath"
    }

    fn functions(&self) -> &'static [&'static str] {
        &["load_file", "load_string", "query", "dispose_document"]
    }

    fn dispatch(&self, function: &str, params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
        match function {
            "load_file" => load_file(params, ctx),
            "load_string" => load_string(params, ctx),
            "query" => query(params, ctx),
            "dispose_document" => dispose_document(params, ctx),
            other => Err(HelperError::UnknownFunction(other.to_string())),
        }
    }
}

struct XmlDocument {
    package: Package,
}

fn load_file(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let path = params.required_str("path", 0)?;
    let xml = std::fs::read_to_string(&path).map_err(|e| HelperError::DriverError(format!("reading {path}: {e}")))?;
    load(xml, ctx, json!({"path": path}))
}

fn load_string(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let xml = params.required_str("xml", 0)?;
    load(xml, ctx, json!({}))
}

fn load(xml: String, ctx: &HelperCtx, metadata: Value) -> Result<Value, HelperError> {
    let package = parser::parse(&xml).map_err(|e| HelperError::InvalidParams(format!("malformed XML: {e}")))?;
    let id = ctx.registry.create(hd_registry::Kind::Doc, Box::new(XmlDocument { package }), None, metadata);
    Ok(json!({"doc_id": id}))
}

fn query(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let doc_id = params.required_str("doc_id", 0)?;
    let expr = params.required_str("xpath", 1)?;

    let entry = ctx.registry.get(&doc_id, Some(hd_registry::Kind::Doc))?;
    entry.with_state(&**ctx.registry.clock(), |state| {
        let doc = state
            .payload
            .downcast_ref::<XmlDocument>()
            .ok_or_else(|| HelperError::Internal("xpath document payload type mismatch".into()))?;
        let document = doc.package.as_document();
        let value = sxd_xpath::evaluate_xpath(&document, &expr)
            .map_err(|e| HelperError::DriverError(format!("xpath evaluation failed: {e}")))?;
        Ok(json!({"result": xpath_value_to_json(value)}))
    })
}

fn xpath_value_to_json(value: XPathValue) -> Value {
    match value {
        XPathValue::Boolean(b) => Value::Bool(b),
        XPathValue::Number(n) => json!(n),
        XPathValue::String(s) => Value::String(s),
        XPathValue::Nodeset(nodes) => Value::Array(nodes.document_order().into_iter().map(|n| Value::String(n.string_value())).collect()),
    }
}

fn dispose_document(params: Params, ctx: &HelperCtx) -> Result<Value, HelperError> {
    let doc_id = params.required_str("doc_id", 0)?;
    ctx.registry.destroy(&doc_id);
    Ok(json!({"success": true}))
}

#[cfg(test)]
#[path = "xpath_tests.rs"]
mod tests;
