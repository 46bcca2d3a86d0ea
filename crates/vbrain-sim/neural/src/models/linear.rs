// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Linear model: `dx/dt = gamma × x + c₀ + lc × x`

use super::traits::{check_finite, check_layout, LocalDynamics, ModelParameters};
use crate::types::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct LinearParameters {
    /// Decay rate (negative for a stable fixed point at 0)
    pub gamma: f64,
}

impl Default for LinearParameters {
    fn default() -> Self {
        Self { gamma: -10.0 }
    }
}

impl ModelParameters for LinearParameters {
    fn validate(&self) -> Result<()> {
        check_finite("LinearModel", "gamma", self.gamma)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub params: LinearParameters,
    modes: usize,
    cvar: Vec<usize>,
}

impl LinearModel {
    pub fn new(params: LinearParameters) -> Self {
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

impl Default for LinearModel {
    fn default() -> Self {
        Self::new(LinearParameters::default())
    }
}

impl LocalDynamics for LinearModel {
    fn model_name(&self) -> &'static str {
        "LinearModel"
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
        vec![(-1.0, 1.0)]
    }

    fn validate(&self) -> Result<()> {
        check_layout(self.model_name(), self.nvar(), self.modes, &self.cvar)?;
        self.params.validate()
    }

    #[inline(always)]
    fn dfun_point(&self, x: &[f64], c: &[f64], local_coupling: f64, dx: &mut [f64]) {
        let c0 = c.first().copied().unwrap_or(0.0);
        dx[0] = self.params.gamma * x[0] + c0 + local_coupling * x[0];
    }
}
