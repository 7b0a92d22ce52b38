// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! The `test` module: `ping` and `health`, used by clients and smoke
//! tests to check liveness without exercising a real resource driver.

use serde_json::{json, Value};

use crate::error::HelperError;
use crate::module::{HelperCtx, HelperModule};
use crate::params::Params;

pub struct TestModule;

impl HelperModule for TestModule {
    fn name(&self) -> &'static str {
        "test"
    }

    fn functions(&self) -> &'static [&'static str] {
        &["ping", "health"]
    }

    fn dispatch(
        &self,
        function: &str,
        _params: Params,
        ctx: &HelperCtx,
    ) -> Result<Value, HelperError> {
        match function {
            "ping" => Ok(json!({"ok": true, "uptime_seconds": ctx.health.uptime_seconds()})),
            "health" => {
                let (current, peak) = ctx.health.active_connections();
                let stats = ctx.registry.stats();
                let resources: serde_json::Map<String, Value> = stats
                    .into_iter()
                    .map(|(kind, count)| (kind.to_string(), json!(count)))
                    .collect();
                Ok(json!({
                    "uptime_seconds": ctx.health.uptime_seconds(),
                    "requests_processed": ctx.health.requests_processed(),
                    "requests_failed": ctx.health.requests_failed(),
                    "active_connections": {"current": current, "peak": peak},
                    "resources": resources,
                }))
            }
            other => Err(HelperError::UnknownFunction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hd_registry::Registry;
    use std::sync::Arc;

    fn ctx() -> HelperCtx {
        HelperCtx {
            registry: Arc::new(Registry::new(Arc::new(hd_core::SystemClock))),
            health: Arc::new(crate::health::HealthState::new()),
        }
    }

    #[test]
    fn ping_reports_ok_true_and_a_nonnegative_uptime() {
        let module = TestModule;
        let result = module.dispatch("ping", Params::new(json!({})), &ctx()).unwrap();
        assert_eq!(result["ok"], true);
        assert!(result["uptime_seconds"].as_u64().unwrap() < 60);
    }

    #[test]
    fn health_reports_resource_counts_per_kind() {
        let c = ctx();
        c.registry.create(hd_registry::Kind::Conn, Box::new(()), None, json!({}));
        let module = TestModule;
        let result = module.dispatch("health", Params::new(json!({})), &c).unwrap();
        assert_eq!(result["resources"]["conn"], 1);
    }
}
