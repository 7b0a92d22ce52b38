// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

use std::collections::HashSet;
use std::sync::Arc;

use hd_core::test_support::FakeClock;
use serde_json::json;

use super::*;
use crate::kind::Kind;

fn registry() -> Registry {
    Registry::new(Arc::new(FakeClock::new()))
}

#[test]
fn create_returns_a_namespaced_id() {
    let reg = registry();
    let id = reg.create(Kind::Conn, Box::new(()), None, json!({}));
    assert!(id.starts_with("conn_"));
}

#[test]
fn get_on_unknown_id_is_not_found() {
    let reg = registry();
    let err = reg.get("conn_nope", None).unwrap_err();
    assert_eq!(err, RegistryError::NotFound("conn_nope".to_string()));
}

#[test]
fn get_with_wrong_expected_kind_is_not_found() {
    let reg = registry();
    let id = reg.create(Kind::Conn, Box::new(()), None, json!({}));
    let err = reg.get(&id, Some(Kind::Stmt)).unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
}

#[test]
fn children_lists_direct_children_only() {
    let reg = registry();
    let conn = reg.create(Kind::Conn, Box::new(()), None, json!({}));
    let stmt1 = reg.create(Kind::Stmt, Box::new(()), Some(conn.clone()), json!({}));
    let stmt2 = reg.create(Kind::Stmt, Box::new(()), Some(conn.clone()), json!({}));

    let mut kids = reg.children(&conn);
    kids.sort();
    let mut expected = vec![stmt1, stmt2];
    expected.sort();
    assert_eq!(kids, expected);
}

#[test]
fn destroying_a_parent_cascades_child_first() {
    let reg = registry();
    let conn = reg.create(Kind::Conn, Box::new(()), None, json!({}));
    let stmt = reg.create(Kind::Stmt, Box::new(()), Some(conn.clone()), json!({}));

    let destroyed = reg.destroy(&conn);
    // Child must appear before parent in the destroyed order.
    let stmt_pos = destroyed.iter().position(|id| id == &stmt).unwrap();
    let conn_pos = destroyed.iter().position(|id| id == &conn).unwrap();
    assert!(stmt_pos < conn_pos);

    assert!(reg.get(&stmt, None).is_err());
    assert!(reg.get(&conn, None).is_err());
}

#[test]
fn destroy_is_idempotent() {
    let reg = registry();
    let conn = reg.create(Kind::Conn, Box::new(()), None, json!({}));
    assert!(!reg.destroy(&conn).is_empty());
    assert!(reg.destroy(&conn).is_empty()); // second call: no-op, not an error
}

#[test]
fn destroy_runs_the_kind_release_hook() {
    let reg = registry();
    let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let ran_clone = Arc::clone(&ran);
    reg.set_release_hook(Kind::Cipher, move |_entry| {
        ran_clone.store(true, std::sync::atomic::Ordering::SeqCst);
    });

    let id = reg.create(Kind::Cipher, Box::new(()), None, json!({}));
    reg.destroy(&id);
    assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
}

#[test]
fn stats_counts_live_entries_per_kind() {
    let reg = registry();
    reg.create(Kind::Conn, Box::new(()), None, json!({}));
    reg.create(Kind::Conn, Box::new(()), None, json!({}));
    reg.create(Kind::Cipher, Box::new(()), None, json!({}));

    let stats = reg.stats();
    assert_eq!(stats[&Kind::Conn], 2);
    assert_eq!(stats[&Kind::Cipher], 1);
    assert_eq!(stats[&Kind::Lock], 0);
}

#[test]
fn touch_updates_last_used_at() {
    let clock = Arc::new(FakeClock::new());
    let reg = Registry::new(Arc::clone(&clock) as Arc<dyn hd_core::Clock>);
    let id = reg.create(Kind::Lock, Box::new(()), None, json!({}));
    let entry = reg.get(&id, None).unwrap();
    let before = entry.last_used_at();

    clock.advance(std::time::Duration::from_secs(10));
    reg.touch(&id).unwrap();

    let after = entry.last_used_at();
    assert!(after > before);
}

#[test]
fn ids_are_unique_across_many_creates() {
    let reg = registry();
    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let id = reg.create(Kind::Conn, Box::new(()), None, json!({}));
        assert!(seen.insert(id));
    }
}

#[test]
fn with_state_serializes_access_to_the_payload() {
    let reg = registry();
    let id = reg.create(Kind::Conn, Box::new(0i32), None, json!({}));
    let entry = reg.get(&id, None).unwrap();

    for _ in 0..5 {
        entry.with_state(&**reg.clock(), |state| {
            let counter = state.payload.downcast_mut::<i32>().unwrap();
            *counter += 1;
        });
    }

    entry.with_state(&**reg.clock(), |state| {
        let counter = state.payload.downcast_ref::<i32>().unwrap();
        assert_eq!(*counter, 5);
    });
}
