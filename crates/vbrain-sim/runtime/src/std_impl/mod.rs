// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # vbrain Runtime - Standard (Desktop/Server)
//!
//! Platform adapter for desktop and server environments with full std library support.
//!
//! ## Features
//! - Dynamic allocation (`Vec`) bounded by a configurable memory limit
//! - Parallel processing (Rayon)
//!
//! This module is only available when the `std` feature is enabled.

pub mod history;
pub mod runtime;

pub use history::{DelayedView, HistoryBuffer};
pub use runtime::StdRuntime;

/// Runtime configuration for std platform
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of parallel threads (0 = auto-detect, 1 = sequential)
    pub num_threads: usize,

    /// Minimum node count before intra-step work is parallelised
    pub parallel_threshold: usize,

    /// Upper bound for history storage (None = unlimited)
    pub history_memory_limit_bytes: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            num_threads: 0, // Auto-detect
            parallel_threshold: 256,
            history_memory_limit_bytes: Some(4096 * 1024 * 1024),
        }
    }
}
