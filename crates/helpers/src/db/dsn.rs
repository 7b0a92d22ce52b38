// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! DSN parsing and auth-mode resolution.
//!
//! Recognizes the two dialect families by DSN prefix; every other form
//! is rejected at `connect` time, never reaching a driver.

use super::error::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbFamily {
    Oracle,
    Informix,
}

impl DbFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbFamily::Oracle => "oracle",
            DbFamily::Informix => "informix",
        }
    }
}

/// A DSN after family detection, carrying the driver-specific connect
/// string with the `dbi:<Family>:` (or legacy `user@sid`) wrapper
/// stripped off.
#[derive(Debug, Clone)]
pub struct ParsedDsn {
    pub family: DbFamily,
    pub connect_string: String,
}

/// Parse a DSN, recognizing:
/// - `dbi:Oracle:...` (including `dbi:Oracle:host=...;port=...;service_name=...`)
/// - `dbi:Informix:...`
/// - legacy `user@sid`, where the `@sid` folds into an Oracle DSN
///
/// Any other form is rejected at connect time.
pub fn parse(dsn: &str) -> Result<ParsedDsn, DbError> {
    let trimmed = dsn.trim();
    if trimmed.is_empty() {
        return Err(DbError::InvalidParams("dsn must not be empty".into()));
    }

    for (prefix, family) in
        [("dbi:Oracle:", DbFamily::Oracle), ("dbi:Informix:", DbFamily::Informix)]
    {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            if rest.is_empty() {
                return Err(DbError::InvalidParams(format!("dsn has no body after {prefix}")));
            }
            return Ok(ParsedDsn { family, connect_string: rest.to_string() });
        }
    }

    // Legacy `user@sid` form: everything after the last `@` is the sid,
    // folded into an Oracle connect string.
    if let Some(at) = trimmed.rfind('@') {
        let sid = &trimmed[at + 1..];
        if !sid.is_empty() {
            return Ok(ParsedDsn { family: DbFamily::Oracle, connect_string: format!("sid={sid}") });
        }
    }

    Err(DbError::InvalidParams(format!("unrecognized DSN family: {dsn}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Password,
    Kerberos,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Password => "password",
            AuthMode::Kerberos => "kerberos",
        }
    }
}

/// Resolve `auth_mode`: `password` and `kerberos` are
/// taken literally; `auto` keys off the joint presence of `KRB5_CONFIG`
/// and `KRB5CCNAME` in the environment. Callers pass the two booleans in
/// (rather than reading `std::env` here) so the heuristic is testable
/// without mutating process-global environment state.
pub fn resolve_auth_mode(
    requested: &str,
    krb5_config_set: bool,
    krb5_ccname_set: bool,
) -> Result<AuthMode, DbError> {
    match requested {
        "password" => Ok(AuthMode::Password),
        "kerberos" => Ok(AuthMode::Kerberos),
        "auto" => {
            if krb5_config_set && krb5_ccname_set {
                Ok(AuthMode::Kerberos)
            } else {
                Ok(AuthMode::Password)
            }
        }
        other => Err(DbError::InvalidParams(format!("unknown auth_mode: {other}"))),
    }
}

#[cfg(test)]
#[path = "dsn_tests.rs"]
mod tests;
