// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

use super::*;
use crate::db::bind::Binds;
use crate::db::dsn::AuthMode;
use crate::db::driver::{ConnectOptions, DbConnection, DbDriver};
use crate::db::fake_driver::FakeDriver;

fn prepare(sql: &str) -> StatementState {
    let driver = FakeDriver;
    let dsn = crate::db::dsn::parse("dbi:Oracle:sid=XE").unwrap();
    let mut conn = driver.connect(&dsn, Some("hr"), Some("pw"), AuthMode::Password, &ConnectOptions::default()).unwrap();
    let cursor = conn.prepare(sql).unwrap();
    StatementState::new(cursor, sql.to_string())
}

#[test]
fn fetch_row_before_execute_is_a_state_error() {
    let mut stmt = prepare("SELECT 1 FROM DUAL");
    assert!(matches!(stmt.fetch_row().unwrap_err(), DbError::State(_)));
}

#[test]
fn peek_does_not_consume_the_row_fetch_row_later_returns() {
    let mut stmt = prepare("SELECT 1 FROM DUAL");
    stmt.execute(&Binds::Positional(vec![])).unwrap();

    assert!(stmt.peek_has_rows().unwrap());
    assert!(stmt.peek_has_rows().unwrap());

    let row = stmt.fetch_row().unwrap();
    assert_eq!(row, Some(vec![serde_json::Value::from(1)]));
    assert_eq!(stmt.fetch_row().unwrap(), None);
}

#[test]
fn fetch_all_drains_the_whole_result_set_once() {
    let mut stmt = prepare("SELECT 1 FROM DUAL");
    stmt.execute(&Binds::Positional(vec![])).unwrap();
    let rows = stmt.fetch_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(stmt.fetch_all().unwrap().len(), 0);
}

#[test]
fn dml_statement_reports_no_columns_and_is_not_peekable_as_rows() {
    let mut stmt = prepare("DELETE FROM accounts");
    stmt.execute(&Binds::Positional(vec![])).unwrap();
    assert!(stmt.columns.is_none());
    assert_eq!(stmt.rows_affected, 1);
    assert_eq!(stmt.fetch_row().unwrap(), None);
}
