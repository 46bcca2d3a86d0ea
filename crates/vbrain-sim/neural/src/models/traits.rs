// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Local dynamics trait

use crate::types::{Result, SimError, StateArray};

#[cfg(feature = "std")]
use rayon::prelude::*;

/// Model parameter sets validate their own domains
pub trait ModelParameters: Clone + Default {
    fn validate(&self) -> Result<()>;
}

/// Dynamics of a single network node
///
/// A model exposes `nvar()` state variables for each of `number_of_modes()`
/// modes. The derivative of one `(node, mode)` point depends only on that
/// point's state, its long-range coupling input and the local coupling
/// strength, which is what makes per-point parallel evaluation safe.
pub trait LocalDynamics: Send + Sync {
    /// Human-readable model name (for logging/debugging)
    fn model_name(&self) -> &'static str;

    /// Number of state variables per point
    fn nvar(&self) -> usize;

    fn number_of_modes(&self) -> usize;

    /// State variables read by long-range coupling (in coupling-row order)
    fn coupling_variables(&self) -> &[usize];

    /// Variables recorded by monitors unless told otherwise
    fn variables_of_interest(&self) -> Vec<usize> {
        (0..self.nvar()).collect()
    }

    /// Range per state variable used to draw random initial conditions
    fn state_variable_range(&self) -> Vec<(f64, f64)>;

    fn validate(&self) -> Result<()>;

    /// Derivative of one point
    ///
    /// # Arguments
    /// * `x` - State variables of the point (length `nvar`)
    /// * `c` - Coupling input, one value per coupling variable
    /// * `local_coupling` - Local (self) coupling strength
    /// * `dx` - Output derivative (length `nvar`)
    fn dfun_point(&self, x: &[f64], c: &[f64], local_coupling: f64, dx: &mut [f64]);

    /// Derivative of the whole state
    fn dfun(&self, state: &StateArray, coupling: &StateArray, local_coupling: f64) -> StateArray {
        let (n_vars, n_nodes, n_modes) = state.shape();
        let mut out = StateArray::zeros(n_vars, n_nodes, n_modes);
        let mut x = vec![0.0; n_vars];
        let mut c = vec![0.0; coupling.n_vars()];
        let mut dx = vec![0.0; n_vars];
        for node in 0..n_nodes {
            for mode in 0..n_modes {
                state.read_point(node, mode, &mut x);
                coupling.read_point(node, mode, &mut c);
                self.dfun_point(&x, &c, local_coupling, &mut dx);
                out.set_point(node, mode, &dx);
            }
        }
        out
    }

    /// Derivative of the whole state, optionally evaluated in parallel
    ///
    /// Points are computed independently and scattered afterwards, so the
    /// result does not depend on `parallel`.
    fn dfun_with(
        &self,
        state: &StateArray,
        coupling: &StateArray,
        local_coupling: f64,
        parallel: bool,
    ) -> StateArray {
        #[cfg(feature = "std")]
        if parallel {
            let (n_vars, n_nodes, n_modes) = state.shape();
            let points: Vec<Vec<f64>> = (0..n_nodes * n_modes)
                .into_par_iter()
                .map(|p| {
                    let (node, mode) = (p / n_modes, p % n_modes);
                    let x = state.point(node, mode);
                    let c = coupling.point(node, mode);
                    let mut dx = vec![0.0; n_vars];
                    self.dfun_point(&x, &c, local_coupling, &mut dx);
                    dx
                })
                .collect();
            let mut out = StateArray::zeros(n_vars, n_nodes, n_modes);
            for (p, dx) in points.iter().enumerate() {
                out.set_point(p / n_modes, p % n_modes, dx);
            }
            return out;
        }
        #[cfg(not(feature = "std"))]
        let _ = parallel;
        self.dfun(state, coupling, local_coupling)
    }
}

/// Validate a `with_modes`/`with_coupling_variables` layout against `nvar`
pub(crate) fn check_layout(model: &'static str, nvar: usize, modes: usize, cvar: &[usize]) -> Result<()> {
    if modes == 0 {
        return Err(SimError::domain(model, "number_of_modes", "must be at least 1"));
    }
    if cvar.is_empty() {
        return Err(SimError::domain(model, "cvar", "at least one coupling variable required"));
    }
    if let Some(&bad) = cvar.iter().find(|&&v| v >= nvar) {
        return Err(SimError::domain(
            model,
            "cvar",
            format!("index {} out of range for {} state variables", bad, nvar),
        ));
    }
    Ok(())
}

pub(crate) fn check_finite(model: &'static str, parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::domain(model, parameter, format!("must be finite, got {}", value)))
    }
}
