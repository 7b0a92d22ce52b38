// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

pub use crate::clock::test_support::FakeClock;

/// Proptest strategies for core id/value types.
pub mod strategies {
    use proptest::prelude::*;

    /// An arbitrary JSON scalar suitable as a bind value in property tests.
    pub fn arb_json_scalar() -> impl Strategy<Value = serde_json::Value> {
        prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::Bool),
            any::<i64>().prop_map(|n| serde_json::Value::Number(n.into())),
            "[a-zA-Z0-9 ]{0,32}".prop_map(serde_json::Value::String),
        ]
    }
}
