// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runtime abstraction traits
//!
//! The engine is written against these traits so the same stepping code can
//! run over any storage the platform provides.

pub mod runtime;

// Re-export key types
pub use crate::error::{Result, RuntimeError};
pub use runtime::{HistoryLayout, HistoryStorage, Runtime};
