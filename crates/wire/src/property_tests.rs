// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Property: every request that round-trips through JSON encode/decode
//! is byte-for-byte equal, and every response has the envelope shape
//! callers rely on (success boolean; result present iff success).

use super::*;
use hd_core::test_support::strategies::arb_json_scalar;
use proptest::prelude::*;

proptest! {
    #[test]
    fn request_survives_json_roundtrip(
        module in "[a-z]{1,12}",
        function in "[a-z_]{1,16}",
        value in arb_json_scalar(),
    ) {
        let req = Request::new(module, function, value);
        let json = serde_json::to_vec(&req).unwrap();
        let back: Request = serde_json::from_slice(&json).unwrap();
        prop_assert_eq!(req, back);
    }

    #[test]
    fn ok_response_always_has_result_and_no_error(value in arb_json_scalar()) {
        let resp = Response::ok(value);
        prop_assert!(resp.success);
        prop_assert!(resp.result.is_some());
        prop_assert!(resp.error.is_none());
        prop_assert!(resp.error_kind.is_none());
    }

    #[test]
    fn err_response_always_has_error_and_no_result(message in "[a-zA-Z ]{0,64}") {
        let resp = Response::err(message, hd_core::ErrorKind::Internal);
        prop_assert!(!resp.success);
        prop_assert!(resp.result.is_none());
        prop_assert!(resp.error.is_some());
        prop_assert!(resp.error_kind.is_some());
    }
}
