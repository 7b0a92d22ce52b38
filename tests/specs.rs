// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the hd authors

//! Workspace-level end-to-end tests: drive the daemon exactly as a host
//! process would, over a real Unix socket, rather than calling the
//! dispatcher in-process. Helper-level unit tests already cover the
//! internals in detail; these pin the wire contract.

#[path = "specs/support.rs"]
mod support;

#[path = "specs/ping.rs"]
mod ping;

#[path = "specs/database.rs"]
mod database;

#[path = "specs/crypto.rs"]
mod crypto;

#[path = "specs/dispatch_errors.rs"]
mod dispatch_errors;

#[path = "specs/resource_registry.rs"]
mod resource_registry;
