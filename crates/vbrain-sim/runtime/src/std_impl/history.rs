// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Delay history ring buffer
//!
//! One contiguous `Vec<f64>` holds `depth` slots, each a full
//! `(ncvar, N, M)` coupling-variable state in `StateArray` layout:
//!
//! ```text
//! [slot 0 | slot 1 | ... | slot D-1]
//! slot(t) = t mod D
//! query(t, d) reads slot((t mod D) + D - d) mod D
//! ```
//!
//! The buffer is sized once and never grows during a run.

use crate::error::{Result, RuntimeError};
use crate::traits::{HistoryLayout, HistoryStorage};
use vbrain_sim_neural::{DelayedStates, StateArray};

/// Vec-backed history ring buffer
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    layout: HistoryLayout,
    slot_len: usize,
    data: Vec<f64>,
}

impl HistoryBuffer {
    /// Allocate a zeroed buffer, refusing layouts above `memory_limit` bytes
    pub fn allocate(layout: HistoryLayout, memory_limit: Option<usize>) -> Result<Self> {
        if layout.depth == 0 {
            return Err(RuntimeError::InvalidParameters(
                "history depth must be at least 1".into(),
            ));
        }
        let limit_bytes = memory_limit.unwrap_or(usize::MAX);
        let requested_bytes = layout.total_bytes().unwrap_or(usize::MAX);
        if requested_bytes > limit_bytes || layout.total_bytes().is_none() {
            return Err(RuntimeError::OutOfMemory {
                requested_bytes,
                limit_bytes,
            });
        }
        let slot_len = layout.slot_len().unwrap_or(0);
        Ok(Self {
            layout,
            slot_len,
            data: vec![0.0; slot_len * layout.depth],
        })
    }

    #[inline(always)]
    fn slot_for(&self, t: u64, delay: usize) -> usize {
        let depth = self.layout.depth;
        ((t % depth as u64) as usize + depth - delay) % depth
    }

    #[inline(always)]
    fn offset(&self, cvar: usize, node: usize, mode: usize) -> usize {
        (cvar * self.layout.n_nodes + node) * self.layout.n_modes + mode
    }

    fn check_shape(&self, state: &StateArray) -> Result<()> {
        let expected = (self.layout.n_cvar, self.layout.n_nodes, self.layout.n_modes);
        if state.shape() != expected {
            return Err(RuntimeError::InvalidParameters(format!(
                "history state shape {:?} does not match {:?}",
                state.shape(),
                expected
            )));
        }
        Ok(())
    }

    fn store(&mut self, slot: usize, state: &StateArray) {
        let start = slot * self.slot_len;
        self.data[start..start + self.slot_len].copy_from_slice(state.as_slice());
    }

    /// Copy of the state stored for logical time `t - delay`
    pub fn snapshot(&self, t: u64, delay: usize) -> Result<StateArray> {
        if delay >= self.layout.depth {
            return Err(RuntimeError::CapacityExceeded {
                requested: delay,
                available: self.layout.depth - 1,
            });
        }
        let start = self.slot_for(t, delay) * self.slot_len;
        StateArray::from_vec(
            self.layout.n_cvar,
            self.layout.n_nodes,
            self.layout.n_modes,
            self.data[start..start + self.slot_len].to_vec(),
        )
        .map_err(|e| RuntimeError::InvalidOperation(e.to_string()))
    }
}

impl HistoryStorage for HistoryBuffer {
    fn layout(&self) -> HistoryLayout {
        self.layout
    }

    fn initialize(&mut self, initial: &StateArray) -> Result<()> {
        self.check_shape(initial)?;
        for slot in 0..self.layout.depth {
            self.store(slot, initial);
        }
        Ok(())
    }

    fn initialize_with_trajectory(&mut self, states: &[StateArray]) -> Result<()> {
        let depth = self.layout.depth;
        if states.len() != depth {
            return Err(RuntimeError::InvalidParameters(format!(
                "warm-up trajectory has {} states, history depth is {}",
                states.len(),
                depth
            )));
        }
        for state in states {
            self.check_shape(state)?;
        }
        // states[k] is logical time k - (D - 1)
        for (k, state) in states.iter().enumerate() {
            self.store((k + 1) % depth, state);
        }
        Ok(())
    }

    fn write(&mut self, t: u64, state: &StateArray) -> Result<()> {
        self.check_shape(state)?;
        let slot = (t % self.layout.depth as u64) as usize;
        self.store(slot, state);
        Ok(())
    }

    #[inline(always)]
    fn query(&self, t: u64, delay: usize, cvar: usize, node: usize, mode: usize) -> f64 {
        debug_assert!(delay < self.layout.depth, "delay {} exceeds history", delay);
        let slot = self.slot_for(t, delay);
        self.data[slot * self.slot_len + self.offset(cvar, node, mode)]
    }

    fn try_query(&self, t: u64, delay: usize, cvar: usize, node: usize, mode: usize) -> Result<f64> {
        if delay >= self.layout.depth {
            return Err(RuntimeError::CapacityExceeded {
                requested: delay,
                available: self.layout.depth - 1,
            });
        }
        if cvar >= self.layout.n_cvar || node >= self.layout.n_nodes || mode >= self.layout.n_modes {
            return Err(RuntimeError::InvalidParameters(format!(
                "history index ({}, {}, {}) out of range",
                cvar, node, mode
            )));
        }
        Ok(self.query(t, delay, cvar, node, mode))
    }

    fn memory_bytes(&self) -> usize {
        self.data.len() * core::mem::size_of::<f64>()
    }
}

/// History as seen from logical time `t`
///
/// Adapts any [`HistoryStorage`] to the coupling-side [`DelayedStates`]
/// trait; each edge carries its own delay.
pub struct DelayedView<'a, H: HistoryStorage + ?Sized> {
    pub history: &'a H,
    pub t: u64,
}

impl<'a, H: HistoryStorage + ?Sized> DelayedView<'a, H> {
    pub fn new(history: &'a H, t: u64) -> Self {
        Self { history, t }
    }
}

impl<H: HistoryStorage + ?Sized> DelayedStates for DelayedView<'_, H> {
    #[inline(always)]
    fn delayed(&self, _target: usize, source: usize, delay: usize, cvar: usize, mode: usize) -> f64 {
        self.history.query(self.t, delay, cvar, source, mode)
    }
}
