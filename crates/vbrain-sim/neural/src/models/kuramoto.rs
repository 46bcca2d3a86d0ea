// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Kuramoto phase oscillator: `dθ/dt = omega + c₀ + lc × θ`
//!
//! Pair with [`crate::coupling::Kuramoto`] coupling, which already provides
//! the `sin(θ_j - θ_i)` interaction term.

use super::traits::{check_finite, check_layout, LocalDynamics, ModelParameters};
use crate::types::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct KuramotoParameters {
    /// Natural angular frequency
    pub omega: f64,
}

impl Default for KuramotoParameters {
    fn default() -> Self {
        Self { omega: 1.0 }
    }
}

impl ModelParameters for KuramotoParameters {
    fn validate(&self) -> Result<()> {
        check_finite("KuramotoOscillator", "omega", self.omega)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KuramotoOscillator {
    pub params: KuramotoParameters,
    modes: usize,
    cvar: Vec<usize>,
}

impl KuramotoOscillator {
    pub fn new(params: KuramotoParameters) -> Self {
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

impl Default for KuramotoOscillator {
    fn default() -> Self {
        Self::new(KuramotoParameters::default())
    }
}

impl LocalDynamics for KuramotoOscillator {
    fn model_name(&self) -> &'static str {
        "KuramotoOscillator"
    }

    fn nvar(&self) -> usize {
        1
    }

    fn number_of_modes(&self) -> usize {
        self.modes
    }

    fn coupling_variables(&self) -> &[usize] {
        &self.cvar
    }

    fn state_variable_range(&self) -> Vec<(f64, f64)> {
        vec![(0.0, core::f64::consts::TAU)]
    }

    fn validate(&self) -> Result<()> {
        check_layout(self.model_name(), self.nvar(), self.modes, &self.cvar)?;
        self.params.validate()
    }

    #[inline(always)]
    fn dfun_point(&self, x: &[f64], c: &[f64], local_coupling: f64, dx: &mut [f64]) {
        let c0 = c.first().copied().unwrap_or(0.0);
        dx[0] = self.params.omega + c0 + local_coupling * x[0];
    }
}
