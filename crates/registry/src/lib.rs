// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! The shared resource registry: the in-memory store of identified,
//! long-lived helper objects (connections, statements, ciphers,
//! documents, sessions, locks) and the reaper that evicts idle entries.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod entry;
mod kind;
mod reaper;
mod registry;

pub use entry::{Entry, EntryState, Payload};
pub use kind::Kind;
pub use reaper::{spawn as spawn_reaper, sweep_once, TtlPolicy, DEFAULT_REAPER_INTERVAL, DEFAULT_TTL};
pub use registry::{Registry, RegistryError};
