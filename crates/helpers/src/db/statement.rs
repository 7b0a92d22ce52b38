// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Statement resource payload: execute / fetch_row / fetch_all /
//! finish_statement, plus the peek-buffer lookahead that lets the daemon
//! answer "does this result set have any rows" without consuming a row
//! the client still expects from `fetch_row`.

use serde_json::Value;

use super::driver::{ColumnInfo, DbCursor};
use super::error::DbError;

pub struct StatementState {
    cursor: Box<dyn DbCursor>,
    pub sql: String,
    pub rows_affected: i64,
    pub columns: Option<ColumnInfo>,
    executed: bool,
    /// One row fetched ahead of the client, so a caller who only wants to
    /// know "are there any rows" doesn't consume one `fetch_row` would
    /// otherwise have returned.
    peeked: Option<Option<Vec<Value>>>,
}

impl StatementState {
    pub fn new(cursor: Box<dyn DbCursor>, sql: String) -> Self {
        Self { cursor, sql, rows_affected: 0, columns: None, executed: false, peeked: None }
    }

    pub fn execute(&mut self, binds: &super::bind::Binds) -> Result<(), DbError> {
        let result = self.cursor.execute(binds)?;
        self.rows_affected = result.rows_affected;
        self.columns = result.columns.clone();
        self.executed = true;
        self.peeked = None;

        // Prime the peek buffer for result-set statements so `peek_has_rows`
        // never has to consume a row the client hasn't asked for yet.
        if result.columns.is_some() {
            let row = self.cursor.fetch_one()?;
            self.peeked = Some(row);
        }
        Ok(())
    }

    pub fn out_params(&self) -> std::collections::BTreeMap<String, Value> {
        self.cursor.out_params()
    }

    /// Whether the executed result set has at least one row, without
    /// consuming it.
    pub fn peek_has_rows(&mut self) -> Result<bool, DbError> {
        self.ensure_executed()?;
        Ok(matches!(self.peeked, Some(Some(_))))
    }

    pub fn fetch_row(&mut self) -> Result<Option<Vec<Value>>, DbError> {
        self.ensure_executed()?;
        if let Some(row) = self.peeked.take() {
            return Ok(row);
        }
        self.cursor.fetch_one()
    }

    pub fn fetch_all(&mut self) -> Result<Vec<Vec<Value>>, DbError> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_row()? {
            rows.push(row);
        }
        Ok(rows)
    }

    pub fn finish(&mut self) -> Result<(), DbError> {
        self.cursor.close()
    }

    fn ensure_executed(&self) -> Result<(), DbError> {
        if !self.executed {
            return Err(DbError::State("statement has not been executed".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "statement_tests.rs"]
mod tests;
