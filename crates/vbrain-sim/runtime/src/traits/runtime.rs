// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runtime abstraction traits
//!
//! ## Design Philosophy
//!
//! - **Storage Abstraction**: the simulator asks the runtime for history
//!   storage and never allocates it directly
//! - **Zero-Cost**: traits compile to direct calls on the hot path
//! - **Capability Queries**: parallelism and memory limits are decided by the
//!   platform, not hard-coded in the engine

use crate::error::Result;
use vbrain_sim_neural::StateArray;

/// Runtime trait: abstracts storage implementation and platform capabilities
///
/// # Example
///
/// ```ignore
/// pub struct StdRuntime;
///
/// impl Runtime for StdRuntime {
///     type History = HistoryBuffer;
///
///     fn create_history(&self, layout: HistoryLayout) -> Result<HistoryBuffer> {
///         HistoryBuffer::allocate(layout, self.memory_limit())
///     }
///
///     fn supports_parallel(&self) -> bool { true }
///     fn memory_limit(&self) -> Option<usize> { None }
/// }
/// ```
pub trait Runtime: Send + Sync {
    /// History storage type
    type History: HistoryStorage;

    /// Allocate history storage for the given layout
    ///
    /// Fails with `RuntimeError::OutOfMemory` when the buffer would exceed
    /// [`Runtime::memory_limit`].
    fn create_history(&self, layout: HistoryLayout) -> Result<Self::History>;

    /// Platform supports parallel processing (multi-threading)
    fn supports_parallel(&self) -> bool;

    /// Node count at which intra-step parallelism starts paying off
    fn parallel_threshold(&self) -> usize {
        256
    }

    /// Platform memory limit for history storage in bytes (None = unlimited)
    fn memory_limit(&self) -> Option<usize>;

    /// Platform name for logging/debugging
    fn platform_name(&self) -> &'static str {
        "Generic Runtime"
    }
}

/// Shape of a history ring buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLayout {
    /// Number of slots (`max_delay + 1`)
    pub depth: usize,
    /// Coupling variables stored per point
    pub n_cvar: usize,
    pub n_nodes: usize,
    pub n_modes: usize,
}

impl HistoryLayout {
    /// Number of `f64` values in one slot
    pub fn slot_len(&self) -> Option<usize> {
        self.n_cvar
            .checked_mul(self.n_nodes)?
            .checked_mul(self.n_modes)
    }

    /// Total bytes for all slots, `None` on overflow
    pub fn total_bytes(&self) -> Option<usize> {
        self.slot_len()?
            .checked_mul(self.depth)?
            .checked_mul(core::mem::size_of::<f64>())
    }
}

/// History storage trait: ring buffer of past coupling-variable states
///
/// Logical time `t` maps to slot `t mod depth`. A query at time `t` with
/// delay `d` reads the state written at `t - d`, so `d` must be `< depth`.
pub trait HistoryStorage: Send + Sync {
    fn layout(&self) -> HistoryLayout;

    /// Number of slots
    fn depth(&self) -> usize {
        self.layout().depth
    }

    /// Fill every slot with the same state
    fn initialize(&mut self, initial: &StateArray) -> Result<()>;

    /// Fill from a warm-up trajectory of exactly `depth` states
    ///
    /// States are ordered oldest first; the last one is the state at `t = 0`.
    fn initialize_with_trajectory(&mut self, states: &[StateArray]) -> Result<()>;

    /// Store the coupling-variable state of logical time `t`
    fn write(&mut self, t: u64, state: &StateArray) -> Result<()>;

    /// Value written at `t - delay` (hot path, bounds checked in debug builds)
    fn query(&self, t: u64, delay: usize, cvar: usize, node: usize, mode: usize) -> f64;

    /// Checked variant of [`HistoryStorage::query`]
    fn try_query(&self, t: u64, delay: usize, cvar: usize, node: usize, mode: usize) -> Result<f64>;

    /// Bytes held by the buffer
    fn memory_bytes(&self) -> usize;
}
