// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

use super::*;
use crate::db::dsn::DbFamily;
use crate::db::driver::DbDriver;
use crate::db::fake_driver::FakeDriver;

fn new_state(autocommit: bool) -> ConnectionState {
    let driver = FakeDriver;
    let dsn = crate::db::dsn::parse("dbi:Oracle:sid=XE").unwrap();
    let conn = driver
        .connect(&dsn, Some("hr"), Some("pw"), crate::db::dsn::AuthMode::Password, &{
            let mut o = crate::db::driver::ConnectOptions::default();
            o.autocommit = autocommit;
            o
        })
        .unwrap();
    ConnectionState::new(conn, DbFamily::Oracle, autocommit, false, true)
}

#[test]
fn begin_transaction_twice_is_a_state_error() {
    let mut state = new_state(true);
    state.begin_transaction().unwrap();
    assert!(matches!(state.begin_transaction().unwrap_err(), DbError::State(_)));
}

#[test]
fn commit_with_no_open_transaction_is_a_no_op_under_autocommit() {
    let mut state = new_state(true);
    state.commit().unwrap();
    assert!(!state.in_txn);
}

#[test]
fn commit_with_no_open_transaction_is_a_state_error_under_manual_commit() {
    let mut state = new_state(false);
    assert!(matches!(state.commit().unwrap_err(), DbError::State(_)));
}

#[test]
fn rollback_with_no_open_transaction_is_a_state_error_under_manual_commit() {
    let mut state = new_state(false);
    assert!(matches!(state.rollback().unwrap_err(), DbError::State(_)));
}

#[test]
fn implicit_transaction_starts_only_for_mutating_statements_under_manual_commit() {
    let mut state = new_state(false);
    state.begin_implicit_if_needed(is_mutating_sql("SELECT 1 FROM DUAL")).unwrap();
    assert!(!state.in_txn);

    state.begin_implicit_if_needed(is_mutating_sql("UPDATE t SET x = 1")).unwrap();
    assert!(state.in_txn);
}

#[test]
fn implicit_transaction_never_starts_under_autocommit() {
    let mut state = new_state(true);
    state.begin_implicit_if_needed(is_mutating_sql("UPDATE t SET x = 1")).unwrap();
    assert!(!state.in_txn);
}

#[test]
fn close_rolls_back_a_dangling_transaction() {
    let mut state = new_state(true);
    state.begin_transaction().unwrap();
    state.close().unwrap();
    assert!(!state.in_txn);
}
