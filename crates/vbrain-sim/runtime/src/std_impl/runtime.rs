// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Standard runtime for desktop/server environments

use super::history::HistoryBuffer;
use super::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::traits::{HistoryLayout, Runtime};

/// Desktop/server runtime: Vec-backed storage, Rayon parallelism
#[derive(Debug, Clone, Default)]
pub struct StdRuntime {
    config: RuntimeConfig,
}

impl StdRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Size the global Rayon pool from `num_threads` (0 keeps Rayon's default)
    ///
    /// The global pool can only be built once per process; later calls are
    /// reported as `InvalidOperation` and leave the existing pool in place.
    pub fn init_thread_pool(&self) -> Result<()> {
        if self.config.num_threads == 0 {
            return Ok(());
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build_global()
            .map_err(|e| RuntimeError::InvalidOperation(format!("thread pool: {}", e)))
    }
}

impl Runtime for StdRuntime {
    type History = HistoryBuffer;

    fn create_history(&self, layout: HistoryLayout) -> Result<HistoryBuffer> {
        HistoryBuffer::allocate(layout, self.memory_limit())
    }

    fn supports_parallel(&self) -> bool {
        self.config.num_threads != 1
    }

    fn parallel_threshold(&self) -> usize {
        self.config.parallel_threshold
    }

    fn memory_limit(&self) -> Option<usize> {
        self.config.history_memory_limit_bytes
    }

    fn platform_name(&self) -> &'static str {
        "Desktop (std)"
    }
}
