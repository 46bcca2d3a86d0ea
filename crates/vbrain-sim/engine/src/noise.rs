// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Stochastic Forcing
//!
//! White noise for the stochastic integration schemes.
//!
//! ```text
//! dW      = sqrt(dt) × N(0, 1)            one draw per state element
//! g(x)    = sqrt(2 × nsig[v])             additive
//! g(x)    = sqrt(2 × nsig[v]) × (slope × x + intercept)   multiplicative
//! forcing = g(x) × dW
//! ```
//!
//! Draws are taken in flat `(variable, node, mode)` order from a seeded
//! ChaCha8 stream, so a given seed reproduces the same trajectory regardless
//! of thread count.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use vbrain_sim_neural::{Result, SimError, StateArray};

/// Default noise seed
pub const DEFAULT_SEED: u64 = 42;

/// Seeded standard-normal source
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    seed: u64,
    rng: ChaCha8Rng,
    /// Second value of the last Box-Muller pair
    spare: Option<f64>,
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            spare: None,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from its seed
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.spare = None;
    }

    /// Standard normal via Box-Muller
    pub fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }
        // 1 - u keeps the log argument in (0, 1]
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen::<f64>();
        let radius = (-2.0 * u1.ln()).sqrt();
        let angle = core::f64::consts::TAU * u2;
        self.spare = Some(radius * angle.sin());
        radius * angle.cos()
    }

    /// Wiener increments `sqrt(dt) × N(0, 1)` for every element of a state
    pub fn wiener_increment(&mut self, dt: f64, shape: (usize, usize, usize)) -> StateArray {
        let (n_vars, n_nodes, n_modes) = shape;
        let sqrt_dt = dt.sqrt();
        let mut dw = StateArray::zeros(n_vars, n_nodes, n_modes);
        for value in dw.as_mut_slice() {
            *value = sqrt_dt * self.standard_normal();
        }
        dw
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Noise amplitude model
#[derive(Debug, Clone, PartialEq)]
pub enum Noise {
    Additive {
        nsig: Vec<f64>,
    },
    Multiplicative {
        nsig: Vec<f64>,
        slope: f64,
        intercept: f64,
    },
}

impl Noise {
    /// Additive noise with one intensity for every state variable
    pub fn additive(nsig: f64) -> Self {
        Noise::Additive { nsig: vec![nsig] }
    }

    pub fn nsig(&self) -> &[f64] {
        match self {
            Noise::Additive { nsig } | Noise::Multiplicative { nsig, .. } => nsig,
        }
    }

    /// Check intensities against the model's variable count
    pub fn validate(&self, nvar: usize) -> Result<()> {
        let nsig = self.nsig();
        if nsig.len() != 1 && nsig.len() != nvar {
            return Err(SimError::mismatch("noise nsig", nvar, nsig.len()));
        }
        if let Some(bad) = nsig.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(SimError::domain(
                "Noise",
                "nsig",
                format!("must be finite and non-negative, got {}", bad),
            ));
        }
        if let Noise::Multiplicative {
            slope, intercept, ..
        } = self
        {
            if !slope.is_finite() || !intercept.is_finite() {
                return Err(SimError::domain("Noise", "slope", "slope and intercept must be finite"));
            }
        }
        Ok(())
    }

    #[inline]
    fn nsig_for(&self, variable: usize) -> f64 {
        let nsig = self.nsig();
        if nsig.len() == 1 {
            nsig[0]
        } else {
            nsig[variable]
        }
    }

    /// Forcing term `g(x) × dW`
    pub fn forcing(&self, state: &StateArray, dw: &StateArray) -> StateArray {
        let (n_vars, n_nodes, n_modes) = state.shape();
        let mut out = StateArray::zeros(n_vars, n_nodes, n_modes);
        for v in 0..n_vars {
            let amplitude = (2.0 * self.nsig_for(v)).sqrt();
            let xs = state.variable(v);
            let dws = dw.variable(v);
            for ((o, x), w) in out.variable_mut(v).iter_mut().zip(xs).zip(dws) {
                let g = match self {
                    Noise::Additive { .. } => amplitude,
                    Noise::Multiplicative {
                        slope, intercept, ..
                    } => amplitude * (slope * x + intercept),
                };
                *o = g * w;
            }
        }
        out
    }
}
