// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Generic 2D Oscillator
//!
//! Two-variable planar oscillator able to express a broad family of
//! excitable and oscillatory regimes through its polynomial nullclines.
//!
//! ## Model Dynamics
//!
//! ```text
//! dV/dt = d × tau × (alpha × W - f × V³ + e × V² + g × V + gamma × I
//!                    + gamma × c₀ + lc × V)
//! dW/dt = d × (a + b × V + c × V² - beta × W) / tau
//!
//!     Where:
//!     - c₀ = long-range coupling input (coupling variable 0, i.e. V)
//!     - lc = local coupling strength
//! ```

use super::traits::{check_finite, check_layout, LocalDynamics, ModelParameters};
use crate::types::{Result, SimError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Generic 2D oscillator parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Generic2dOscillatorParameters {
    /// Time-scale separation between V and W
    pub tau: f64,
    /// Baseline input current
    #[cfg_attr(feature = "serde", serde(rename = "I"))]
    pub i: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Overall temporal scaling
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub g: f64,
    pub alpha: f64,
    pub beta: f64,
    /// Input gain for both baseline current and coupling
    pub gamma: f64,
}

impl Default for Generic2dOscillatorParameters {
    fn default() -> Self {
        Self {
            tau: 1.0,
            i: 0.0,
            a: -2.0,
            b: -10.0,
            c: 0.0,
            d: 0.02,
            e: 3.0,
            f: 1.0,
            g: 0.0,
            alpha: 1.0,
            beta: 1.0,
            gamma: 1.0,
        }
    }
}

impl ModelParameters for Generic2dOscillatorParameters {
    fn validate(&self) -> Result<()> {
        const M: &str = "Generic2dOscillator";
        for (name, value) in [
            ("tau", self.tau),
            ("I", self.i),
            ("a", self.a),
            ("b", self.b),
            ("c", self.c),
            ("d", self.d),
            ("e", self.e),
            ("f", self.f),
            ("g", self.g),
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
        ] {
            check_finite(M, name, value)?;
        }
        if self.tau == 0.0 {
            return Err(SimError::domain(M, "tau", "must be non-zero"));
        }
        Ok(())
    }
}

/// Generic 2D oscillator (state variables `V`, `W`)
#[derive(Debug, Clone, PartialEq)]
pub struct Generic2dOscillator {
    pub params: Generic2dOscillatorParameters,
    modes: usize,
    cvar: Vec<usize>,
}

impl Generic2dOscillator {
    pub fn new(params: Generic2dOscillatorParameters) -> Self {
        Self {
            params,
            modes: 1,
            cvar: vec![0],
        }
    }

    pub fn with_modes(mut self, modes: usize) -> Self {
        self.modes = modes;
        self
    }

    pub fn with_coupling_variables(mut self, cvar: Vec<usize>) -> Self {
        self.cvar = cvar;
        self
    }
}

impl Default for Generic2dOscillator {
    fn default() -> Self {
        Self::new(Generic2dOscillatorParameters::default())
    }
}

impl LocalDynamics for Generic2dOscillator {
    fn model_name(&self) -> &'static str {
        "Generic2dOscillator"
    }

    fn nvar(&self) -> usize {
        2
    }

    fn number_of_modes(&self) -> usize {
        self.modes
    }

    fn coupling_variables(&self) -> &[usize] {
        &self.cvar
    }

    fn variables_of_interest(&self) -> Vec<usize> {
        vec![0]
    }

    fn state_variable_range(&self) -> Vec<(f64, f64)> {
        vec![(-2.0, 4.0), (-6.0, 6.0)]
    }

    fn validate(&self) -> Result<()> {
        check_layout(self.model_name(), self.nvar(), self.modes, &self.cvar)?;
        self.params.validate()
    }

    #[inline(always)]
    fn dfun_point(&self, x: &[f64], c: &[f64], local_coupling: f64, dx: &mut [f64]) {
        let p = &self.params;
        let v = x[0];
        let w = x[1];
        let c0 = c.first().copied().unwrap_or(0.0);
        dx[0] = p.d
            * p.tau
            * (p.alpha * w - p.f * v * v * v + p.e * v * v + p.g * v + p.gamma * p.i
                + p.gamma * c0
                + local_coupling * v);
        dx[1] = p.d * (p.a + p.b * v + p.c * v * v - p.beta * w) / p.tau;
    }
}
