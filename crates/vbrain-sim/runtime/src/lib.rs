// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! # vbrain Runtime Abstraction
//!
//! This crate provides:
//! - **Traits** (always available): `Runtime`, `HistoryStorage`
//! - **Std Implementation** (behind `std` feature): `StdRuntime` and the
//!   Vec-backed `HistoryBuffer` ring buffer
//!
//! ## Usage
//!
//! ```rust
//! use vbrain_sim_runtime::{HistoryLayout, HistoryStorage, Runtime, StdRuntime};
//! use vbrain_sim_neural::StateArray;
//!
//! let runtime = StdRuntime::new();
//! let layout = HistoryLayout { depth: 3, n_cvar: 1, n_nodes: 2, n_modes: 1 };
//! let mut history = runtime.create_history(layout).unwrap();
//! history.initialize(&StateArray::filled(1, 2, 1, 0.5)).unwrap();
//! assert_eq!(history.query(0, 2, 0, 1, 0), 0.5);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;

// Traits module (always available)
pub mod traits;

// Re-export traits for convenience
pub use traits::{HistoryLayout, HistoryStorage, Result, Runtime, RuntimeError};

// Standard library implementation (behind "std" feature)
#[cfg(feature = "std")]
pub mod std_impl;

#[cfg(feature = "std")]
pub use std_impl::{DelayedView, HistoryBuffer, RuntimeConfig, StdRuntime};

/// Version of the runtime trait API
///
/// Increment this when making breaking changes to the trait API.
pub const RUNTIME_TRAIT_VERSION: u32 = 1;

/// Get the runtime trait API version
pub const fn runtime_trait_version() -> u32 {
    RUNTIME_TRAIT_VERSION
}
