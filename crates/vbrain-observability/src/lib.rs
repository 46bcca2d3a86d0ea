// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # vbrain-observability
//!
//! Logging setup shared by every vbrain binary and test harness.
//!
//! The simulation crates only emit `tracing` events; this crate decides where
//! they go. Per-crate debug flags (`--debug-vbrain-sim-engine`, `VBRAIN_DEBUG`)
//! raise a single crate to `debug` while the rest stays at the base level.
//!
//! ## Features
//! - `file-logging`: per-crate rolling JSON log files (desktop only)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known vbrain crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "vbrain",
    "vbrain-config",
    "vbrain-sim-neural",
    "vbrain-sim-runtime",
    "vbrain-sim-engine",
];

/// `tracing` target of a crate name (`vbrain-sim-engine` -> `vbrain_sim_engine`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
