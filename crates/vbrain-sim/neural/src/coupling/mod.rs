// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Coupling
//!
//! Coupling functions turn delayed states of source nodes into the coupling
//! input of each target node. Where the delayed values come from is abstracted
//! by [`DelayedStates`]: the engine reads a history ring buffer, tests use a
//! dense array.

pub mod function;
pub mod kernels;

pub use function::{
    Coupling, Difference, HyperbolicTangent, Kuramoto, Linear, PreSigmoidal, Scaling, Sigmoidal,
    SigmoidalJansenRit,
};

use crate::types::{Result, SimError, StateArray};

/// Read access to delayed coupling-variable values
pub trait DelayedStates: Sync {
    /// Value of coupling variable `cvar` of `source`, as seen by `target`
    /// through an edge with `delay` steps of lag
    fn delayed(&self, target: usize, source: usize, delay: usize, cvar: usize, mode: usize) -> f64;
}

/// Explicit delayed-state array of shape `(N, ncvar, N, M)`
///
/// Entry `[i][cv][j][m]` is the value of `x_j[cv]` delayed by `d_ij`, as seen
/// by target `i`. The edge delay argument is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseDelayed {
    n_nodes: usize,
    n_cvar: usize,
    n_modes: usize,
    data: Vec<f64>,
}

impl DenseDelayed {
    pub fn new(n_nodes: usize, n_cvar: usize, n_modes: usize, data: Vec<f64>) -> Result<Self> {
        let expected = n_nodes * n_cvar * n_nodes * n_modes;
        if data.len() != expected {
            return Err(SimError::mismatch("delayed state array", expected, data.len()));
        }
        Ok(Self {
            n_nodes,
            n_cvar,
            n_modes,
            data,
        })
    }

    /// Zero-delay view: every target sees the given coupling-variable state
    pub fn from_current(state: &StateArray) -> Self {
        let (n_cvar, n_nodes, n_modes) = state.shape();
        let mut data = Vec::with_capacity(n_nodes * state.len());
        for _target in 0..n_nodes {
            data.extend_from_slice(state.as_slice());
        }
        Self {
            n_nodes,
            n_cvar,
            n_modes,
            data,
        }
    }

    pub fn set(&mut self, target: usize, cvar: usize, source: usize, mode: usize, value: f64) {
        let idx = self.index(target, cvar, source, mode);
        self.data[idx] = value;
    }

    #[inline(always)]
    fn index(&self, target: usize, cvar: usize, source: usize, mode: usize) -> usize {
        ((target * self.n_cvar + cvar) * self.n_nodes + source) * self.n_modes + mode
    }
}

impl DelayedStates for DenseDelayed {
    #[inline]
    fn delayed(&self, target: usize, source: usize, _delay: usize, cvar: usize, mode: usize) -> f64 {
        self.data[self.index(target, cvar, source, mode)]
    }
}
