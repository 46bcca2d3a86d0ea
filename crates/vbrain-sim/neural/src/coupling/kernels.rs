// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Coupling kernels
//!
//! Pure scalar transforms used by the coupling functions. Each is applied
//! either per edge (pre-synaptic) or per node after summation.

/// Logistic function `1 / (1 + e^-z)` without overflow
///
/// Splits on the sign of `z` so that `exp` is only ever evaluated on a
/// non-positive argument. The result is always in `[0, 1]`.
///
/// # Example
/// ```
/// use vbrain_sim_neural::coupling::kernels::logistic;
///
/// assert_eq!(logistic(0.0), 0.5);
/// assert_eq!(logistic(1e6), 1.0);
/// assert_eq!(logistic(-1e6), 0.0);
/// ```
#[inline(always)]
pub fn logistic(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Sigmoidal post transform
///
/// `cmin + (cmax - cmin) * logistic(a * (s - midpoint) / sigma)`
///
/// # Example
/// ```
/// use vbrain_sim_neural::coupling::kernels::sigmoidal;
///
/// let out = sigmoidal(1e6, -1.0, 1.0, 0.0, 230.0, 1.0);
/// assert!(out.is_finite() && out <= 1.0);
/// ```
#[inline(always)]
pub fn sigmoidal(sum: f64, cmin: f64, cmax: f64, midpoint: f64, sigma: f64, a: f64) -> f64 {
    let value = cmin + (cmax - cmin) * logistic(a * (sum - midpoint) / sigma);
    // Rounding in the affine map may step a hair outside the range
    value.max(cmin).min(cmax)
}

/// Hyperbolic tangent post transform: `a * (1 + tanh((b * s - midpoint) / sigma))`
#[inline(always)]
pub fn hyperbolic_tangent(sum: f64, a: f64, b: f64, midpoint: f64, sigma: f64) -> f64 {
    a * (1.0 + ((b * sum - midpoint) / sigma).tanh())
}

/// Pre-synaptic sigmoid of the two-population coupling
///
/// `h * (q + tanh(g * (p * x0 - x1 - theta)))`, where `x0`/`x1` are the first
/// two coupling variables of the source node.
#[inline(always)]
pub fn pre_sigmoidal(x0: f64, x1: f64, theta: f64, h: f64, q: f64, g: f64, p: f64) -> f64 {
    h * (q + (g * (p * x0 - x1 - theta)).tanh())
}

/// Jansen-Rit style sigmoid of the pyramidal potential difference `x0 - x1`
///
/// `cmin + (cmax - cmin) / (1 + exp(r * (midpoint - (x0 - x1))))`
///
/// # Example
/// ```
/// use vbrain_sim_neural::coupling::kernels::jansen_rit_sigmoid;
///
/// // At the midpoint the output is halfway between cmin and cmax
/// let out = jansen_rit_sigmoid(6.0, 0.0, 0.0, 0.005, 6.0, 1.0);
/// assert!((out - 0.0025).abs() < 1e-15);
/// ```
#[inline(always)]
pub fn jansen_rit_sigmoid(x0: f64, x1: f64, cmin: f64, cmax: f64, midpoint: f64, r: f64) -> f64 {
    cmin + (cmax - cmin) * logistic(r * ((x0 - x1) - midpoint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logistic_symmetry() {
        for z in [0.1, 1.0, 5.0, 40.0] {
            let total = logistic(z) + logistic(-z);
            assert!((total - 1.0).abs() < 1e-15, "z={}", z);
        }
    }

    #[test]
    fn test_sigmoidal_extremes_stay_in_range() {
        for s in [1e6, -1e6, 1e300, -1e300] {
            let out = sigmoidal(s, -1.0, 1.0, 0.0, 230.0, 1.0);
            assert!(out.is_finite());
            assert!((-1.0..=1.0).contains(&out));
        }
        assert_eq!(sigmoidal(0.0, -1.0, 1.0, 0.0, 230.0, 1.0), 0.0);
    }

    #[test]
    fn test_hyperbolic_tangent_at_midpoint() {
        assert_eq!(hyperbolic_tangent(0.0, 1.0, 1.0, 0.0, 1.0), 1.0);
        assert!((hyperbolic_tangent(1e9, 2.0, 1.0, 0.0, 1.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_pre_sigmoidal_formula() {
        // g * (p*x0 - x1 - theta) = 60 * (1*1.0 - 0.25 - 0.5) = 15
        let expected = 0.5 * (1.0 + 15.0f64.tanh());
        assert_eq!(pre_sigmoidal(1.0, 0.25, 0.5, 0.5, 1.0, 60.0, 1.0), expected);
    }

    #[test]
    fn test_jansen_rit_saturates() {
        assert!((jansen_rit_sigmoid(1e3, 0.0, 0.0, 0.005, 6.0, 1.0) - 0.005).abs() < 1e-15);
        assert_eq!(jansen_rit_sigmoid(-1e3, 0.0, 0.0, 0.005, 6.0, 1.0), 0.0);
    }
}
