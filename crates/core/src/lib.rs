// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Shared types for the legacy helper daemon: opaque resource ids, the
//! wire-level error taxonomy, and a clock abstraction used by the
//! resource registry's reaper.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod error;
pub mod id;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{unix_seconds, Clock, SystemClock};
pub use error::ErrorKind;
pub use id::{CipherId, ConnId, DocId, IdBuf, LockId, SessionId, StmtId};
