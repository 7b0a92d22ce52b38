// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! The resource kinds the registry tracks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Conn,
    Stmt,
    Cipher,
    Doc,
    Session,
    Lock,
}

impl Kind {
    /// The id prefix used for every resource of this kind, e.g. `conn_`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Kind::Conn => "conn_",
            Kind::Stmt => "stmt_",
            Kind::Cipher => "cipher_",
            Kind::Doc => "doc_",
            Kind::Session => "session_",
            Kind::Lock => "lock_",
        }
    }

    /// All kinds, used to seed `stats()` with zero counts for kinds that
    /// currently have no live resources.
    pub const ALL: [Kind; 6] =
        [Kind::Conn, Kind::Stmt, Kind::Cipher, Kind::Doc, Kind::Session, Kind::Lock];
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix().trim_end_matches('_'))
    }
}
