// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dense state arrays
//!
//! A [`StateArray`] is indexed by `(variable, node, mode)` and stored flat in
//! variable-major order:
//!
//! ```text
//! index = (variable * n_nodes + node) * n_modes + mode
//! ```
//!
//! The same type carries simulator state, coupling input, derivatives and
//! monitor output (where the node axis may hold sensors instead of nodes).

use super::error::{Result, SimError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dense `(variable, node, mode)` array of `f64`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateArray {
    n_vars: usize,
    n_nodes: usize,
    n_modes: usize,
    data: Vec<f64>,
}

impl StateArray {
    /// Create a zero-filled array
    pub fn zeros(n_vars: usize, n_nodes: usize, n_modes: usize) -> Self {
        Self::filled(n_vars, n_nodes, n_modes, 0.0)
    }

    /// Create an array with every element set to `value`
    pub fn filled(n_vars: usize, n_nodes: usize, n_modes: usize, value: f64) -> Self {
        Self {
            n_vars,
            n_nodes,
            n_modes,
            data: vec![value; n_vars * n_nodes * n_modes],
        }
    }

    /// Wrap a flat variable-major buffer
    pub fn from_vec(n_vars: usize, n_nodes: usize, n_modes: usize, data: Vec<f64>) -> Result<Self> {
        let expected = n_vars * n_nodes * n_modes;
        if data.len() != expected {
            return Err(SimError::mismatch("state array length", expected, data.len()));
        }
        Ok(Self {
            n_vars,
            n_nodes,
            n_modes,
            data,
        })
    }

    /// Build a single-mode array from per-variable node vectors
    ///
    /// `rows[v][n]` becomes element `(v, n, 0)`.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_vars = rows.len();
        let n_nodes = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_vars * n_nodes);
        for row in rows {
            if row.len() != n_nodes {
                return Err(SimError::mismatch("state row length", n_nodes, row.len()));
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(n_vars, n_nodes, 1, data)
    }

    #[inline]
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    #[inline]
    pub fn n_modes(&self) -> usize {
        self.n_modes
    }

    /// `(n_vars, n_nodes, n_modes)`
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_vars, self.n_nodes, self.n_modes)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn index(&self, variable: usize, node: usize, mode: usize) -> usize {
        debug_assert!(variable < self.n_vars && node < self.n_nodes && mode < self.n_modes);
        (variable * self.n_nodes + node) * self.n_modes + mode
    }

    #[inline(always)]
    pub fn get(&self, variable: usize, node: usize, mode: usize) -> f64 {
        self.data[self.index(variable, node, mode)]
    }

    #[inline(always)]
    pub fn set(&mut self, variable: usize, node: usize, mode: usize, value: f64) {
        let idx = self.index(variable, node, mode);
        self.data[idx] = value;
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// All variables of one `(node, mode)` point, in variable order
    pub fn point(&self, node: usize, mode: usize) -> Vec<f64> {
        let mut out = vec![0.0; self.n_vars];
        self.read_point(node, mode, &mut out);
        out
    }

    /// Copy one point into `out` (length `n_vars`) without allocating
    #[inline]
    pub fn read_point(&self, node: usize, mode: usize, out: &mut [f64]) {
        for (v, slot) in out.iter_mut().enumerate().take(self.n_vars) {
            *slot = self.get(v, node, mode);
        }
    }

    /// Overwrite one `(node, mode)` point
    #[inline]
    pub fn set_point(&mut self, node: usize, mode: usize, values: &[f64]) {
        for (v, &value) in values.iter().enumerate().take(self.n_vars) {
            self.set(v, node, mode, value);
        }
    }

    /// The node-by-mode block of one variable
    #[inline]
    pub fn variable(&self, variable: usize) -> &[f64] {
        let block = self.n_nodes * self.n_modes;
        &self.data[variable * block..(variable + 1) * block]
    }

    #[inline]
    pub fn variable_mut(&mut self, variable: usize) -> &mut [f64] {
        let block = self.n_nodes * self.n_modes;
        &mut self.data[variable * block..(variable + 1) * block]
    }

    /// Gather a subset of variables (in the given order) into a new array
    pub fn select_variables(&self, variables: &[usize]) -> Result<StateArray> {
        let mut out = StateArray::zeros(variables.len(), self.n_nodes, self.n_modes);
        self.select_variables_into(variables, &mut out)?;
        Ok(out)
    }

    /// Gather a subset of variables into a pre-shaped array
    pub fn select_variables_into(&self, variables: &[usize], out: &mut StateArray) -> Result<()> {
        if out.shape() != (variables.len(), self.n_nodes, self.n_modes) {
            return Err(SimError::mismatch(
                "selected state size",
                variables.len() * self.n_nodes * self.n_modes,
                out.len(),
            ));
        }
        for (dst, &src) in variables.iter().enumerate() {
            if src >= self.n_vars {
                return Err(SimError::Configuration(format!(
                    "variable index {} out of range for {} state variables",
                    src, self.n_vars
                )));
            }
            out.variable_mut(dst).copy_from_slice(self.variable(src));
        }
        Ok(())
    }

    /// Location of the first non-finite element, if any
    pub fn first_non_finite(&self) -> Option<(usize, usize, usize)> {
        let idx = self.data.iter().position(|v| !v.is_finite())?;
        let mode = idx % self.n_modes;
        let node = (idx / self.n_modes) % self.n_nodes;
        let variable = idx / (self.n_modes * self.n_nodes);
        Some((variable, node, mode))
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// `self += scale * other`
    #[inline]
    pub fn add_scaled(&mut self, scale: f64, other: &StateArray) {
        debug_assert_eq!(self.shape(), other.shape());
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += scale * b;
        }
    }

    /// `base + scale * direction`, as a new array
    pub fn offset(base: &StateArray, scale: f64, direction: &StateArray) -> StateArray {
        debug_assert_eq!(base.shape(), direction.shape());
        let data = base
            .data
            .iter()
            .zip(direction.data.iter())
            .map(|(x, d)| x + scale * d)
            .collect();
        StateArray {
            n_vars: base.n_vars,
            n_nodes: base.n_nodes,
            n_modes: base.n_modes,
            data,
        }
    }

    /// `base + sum(scale_k * term_k)`, evaluated left to right per element
    pub fn lincomb(base: &StateArray, terms: &[(f64, &StateArray)]) -> StateArray {
        let mut out = base.clone();
        for (scale, term) in terms {
            out.add_scaled(*scale, term);
        }
        out
    }

    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    /// Replace every mode of a point with the values of mode 0
    ///
    /// Used to replicate a single-mode initial condition across modes.
    pub fn broadcast_modes(single_mode: &StateArray, n_modes: usize) -> StateArray {
        let mut out = StateArray::zeros(single_mode.n_vars, single_mode.n_nodes, n_modes);
        for v in 0..single_mode.n_vars {
            for n in 0..single_mode.n_nodes {
                let value = single_mode.get(v, n, 0);
                for m in 0..n_modes {
                    out.set(v, n, m, value);
                }
            }
        }
        out
    }
}
