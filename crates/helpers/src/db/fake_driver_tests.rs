// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

use super::*;
use crate::db::dsn::parse as parse_dsn;

fn connect() -> Box<dyn DbConnection> {
    let driver = FakeDriver;
    let dsn = parse_dsn("dbi:Oracle:sid=XE").unwrap();
    driver.connect(&dsn, Some("hr"), Some("pw"), AuthMode::Password, &ConnectOptions::default()).unwrap()
}

#[test]
fn select_dual_literal_yields_one_row_then_eof() {
    let mut conn = connect();
    let mut cursor = conn.prepare("SELECT 1 FROM DUAL").unwrap();
    let result = cursor.execute(&Binds::Positional(vec![])).unwrap();
    assert_eq!(result.rows_affected, -1);
    assert_eq!(result.columns.unwrap().count(), 1);

    let row = cursor.fetch_one().unwrap();
    assert_eq!(row, Some(vec![Value::from(1)]));
    assert_eq!(cursor.fetch_one().unwrap(), None);
}

#[test]
fn dml_statement_reports_a_real_not_unknown_row_count() {
    let mut conn = connect();
    let mut cursor = conn.prepare("UPDATE accounts SET balance = 0").unwrap();
    let result = cursor.execute(&Binds::Positional(vec![])).unwrap();
    assert_eq!(result.rows_affected, 1);
    assert!(result.columns.is_none());
}

#[test]
fn out_param_is_retrievable_after_execute() {
    let mut conn = connect();
    let mut cursor = conn.prepare("BEGIN :result := 42; END;").unwrap();
    let named = crate::db::bind::NamedBind {
        value: Value::Null,
        bind_type: crate::db::bind::BindType::Other,
        direction: crate::db::bind::Direction::Out,
        size: None,
    };
    let binds = Binds::Named(vec![("result".to_string(), named)]);
    cursor.execute(&binds).unwrap();
    assert!(cursor.out_params().contains_key("result"));
}
