// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Long-Range Coupling Functions
//!
//! Every coupling function splits into two pure pieces:
//!
//! ```text
//! Per edge (j -> i):   p_ij = pre(x_i, x_j(t - d_ij))
//! Per target node i:   s_i  = Σ_j w_ij × p_ij
//!                      c_i  = post(s_i)
//! ```
//!
//! `x_i` is the current (undelayed) state of the receiving node and
//! `x_j(t - d_ij)` the delayed state of the source read from history.
//! Zero-weight edges are skipped, which is numerically identical to adding
//! a zero contribution.
//!
//! Single-variable functions apply independently per coupling variable and
//! per mode. `PreSigmoidal` and `SigmoidalJansenRit` read the first two
//! coupling variables and write their result to coupling row 0.

use super::kernels;
use super::DelayedStates;
use crate::types::{CouplingGraph, Result, SimError, StateArray};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "std")]
use rayon::prelude::*;

/// Linear: `a × s + b`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Linear {
    pub a: f64,
    pub b: f64,
}

impl Default for Linear {
    fn default() -> Self {
        Self {
            a: 0.00390625,
            b: 0.0,
        }
    }
}

/// Scaling: `a × s`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Scaling {
    pub a: f64,
}

impl Default for Scaling {
    fn default() -> Self {
        Self { a: 0.00390625 }
    }
}

/// Difference: `a × Σ w_ij (x_j - x_i)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Difference {
    pub a: f64,
}

impl Default for Difference {
    fn default() -> Self {
        Self { a: 0.1 }
    }
}

/// Sigmoidal: `cmin + (cmax - cmin) × logistic(a (s - midpoint) / sigma)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Sigmoidal {
    pub cmin: f64,
    pub cmax: f64,
    pub midpoint: f64,
    pub sigma: f64,
    pub a: f64,
}

impl Default for Sigmoidal {
    fn default() -> Self {
        Self {
            cmin: -1.0,
            cmax: 1.0,
            midpoint: 0.0,
            sigma: 230.0,
            a: 1.0,
        }
    }
}

/// Hyperbolic tangent: `a (1 + tanh((b s - midpoint) / sigma))`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct HyperbolicTangent {
    pub a: f64,
    pub b: f64,
    pub midpoint: f64,
    pub sigma: f64,
}

impl Default for HyperbolicTangent {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 1.0,
            midpoint: 0.0,
            sigma: 1.0,
        }
    }
}

/// Kuramoto: `a × Σ w_ij sin(x_j - x_i)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Kuramoto {
    pub a: f64,
}

impl Default for Kuramoto {
    fn default() -> Self {
        Self { a: 1.0 }
    }
}

/// Two-population sigmoid with a (possibly state-dependent) threshold
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PreSigmoidal {
    #[cfg_attr(feature = "serde", serde(rename = "H"))]
    pub h: f64,
    #[cfg_attr(feature = "serde", serde(rename = "Q"))]
    pub q: f64,
    #[cfg_attr(feature = "serde", serde(rename = "G"))]
    pub g: f64,
    #[cfg_attr(feature = "serde", serde(rename = "P"))]
    pub p: f64,
    pub theta: f64,
    /// Threshold follows the receiving node: `theta_i = P x_i[0] - x_i[1]`
    pub dynamic: bool,
    /// Use the node-mean of the dynamic threshold (per mode)
    #[cfg_attr(feature = "serde", serde(rename = "globalT"))]
    pub global_t: bool,
}

impl Default for PreSigmoidal {
    fn default() -> Self {
        Self {
            h: 0.5,
            q: 1.0,
            g: 60.0,
            p: 1.0,
            theta: 0.5,
            dynamic: true,
            global_t: false,
        }
    }
}

/// Jansen-Rit sigmoid of `x_j[0] - x_j[1]`, scaled by `a` after summation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SigmoidalJansenRit {
    pub cmin: f64,
    pub cmax: f64,
    pub midpoint: f64,
    pub r: f64,
    pub a: f64,
}

impl Default for SigmoidalJansenRit {
    fn default() -> Self {
        Self {
            cmin: 0.0,
            cmax: 0.005,
            midpoint: 6.0,
            r: 1.0,
            a: 0.56,
        }
    }
}

/// Long-range coupling function
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Coupling {
    Linear(Linear),
    Scaling(Scaling),
    Difference(Difference),
    Sigmoidal(Sigmoidal),
    HyperbolicTangent(HyperbolicTangent),
    Kuramoto(Kuramoto),
    PreSigmoidal(PreSigmoidal),
    SigmoidalJansenRit(SigmoidalJansenRit),
}

impl Default for Coupling {
    fn default() -> Self {
        Coupling::Linear(Linear::default())
    }
}

/// Per-edge and per-node constants derived from the parameters
#[derive(Debug, Clone, Copy)]
enum Kernel {
    Affine { a: f64, b: f64 },
    Difference { a: f64 },
    Sigmoidal { cmin: f64, cmax: f64, midpoint: f64, sigma: f64, a: f64 },
    Tanh { a: f64, b: f64, midpoint: f64, sigma: f64 },
    Kuramoto { a: f64 },
    PreSigmoidal(PreSigmoidal),
    JansenRit(SigmoidalJansenRit),
}

impl Coupling {
    pub fn name(&self) -> &'static str {
        match self {
            Coupling::Linear(_) => "Linear",
            Coupling::Scaling(_) => "Scaling",
            Coupling::Difference(_) => "Difference",
            Coupling::Sigmoidal(_) => "Sigmoidal",
            Coupling::HyperbolicTangent(_) => "HyperbolicTangent",
            Coupling::Kuramoto(_) => "Kuramoto",
            Coupling::PreSigmoidal(_) => "PreSigmoidal",
            Coupling::SigmoidalJansenRit(_) => "SigmoidalJansenRit",
        }
    }

    /// Minimum number of coupling variables the local model must expose
    pub fn required_coupling_variables(&self) -> usize {
        match self {
            Coupling::PreSigmoidal(_) | Coupling::SigmoidalJansenRit(_) => 2,
            _ => 1,
        }
    }

    /// Validate parameter domains
    ///
    /// Derived constants are rebuilt from the parameters on every evaluation,
    /// so configuring the same function any number of times gives identical
    /// results.
    pub fn configure(&self) -> Result<()> {
        let name = self.name();
        let finite = |parameter: &'static str, value: f64| -> Result<()> {
            if value.is_finite() {
                Ok(())
            } else {
                Err(SimError::domain(name, parameter, format!("must be finite, got {}", value)))
            }
        };
        match *self {
            Coupling::Linear(Linear { a, b }) => {
                finite("a", a)?;
                finite("b", b)?;
            }
            Coupling::Scaling(Scaling { a })
            | Coupling::Difference(Difference { a })
            | Coupling::Kuramoto(Kuramoto { a }) => finite("a", a)?,
            Coupling::Sigmoidal(p) => {
                finite("cmin", p.cmin)?;
                finite("cmax", p.cmax)?;
                finite("midpoint", p.midpoint)?;
                finite("sigma", p.sigma)?;
                finite("a", p.a)?;
                if p.sigma == 0.0 {
                    return Err(SimError::domain(name, "sigma", "must be non-zero"));
                }
                if p.cmax <= p.cmin {
                    return Err(SimError::domain(
                        name,
                        "cmax",
                        format!("must exceed cmin ({} <= {})", p.cmax, p.cmin),
                    ));
                }
            }
            Coupling::HyperbolicTangent(p) => {
                finite("a", p.a)?;
                finite("b", p.b)?;
                finite("midpoint", p.midpoint)?;
                finite("sigma", p.sigma)?;
                if p.sigma == 0.0 {
                    return Err(SimError::domain(name, "sigma", "must be non-zero"));
                }
            }
            Coupling::PreSigmoidal(p) => {
                finite("H", p.h)?;
                finite("Q", p.q)?;
                finite("G", p.g)?;
                finite("P", p.p)?;
                finite("theta", p.theta)?;
            }
            Coupling::SigmoidalJansenRit(p) => {
                finite("cmin", p.cmin)?;
                finite("cmax", p.cmax)?;
                finite("midpoint", p.midpoint)?;
                finite("r", p.r)?;
                finite("a", p.a)?;
                if p.cmax <= p.cmin {
                    return Err(SimError::domain(
                        name,
                        "cmax",
                        format!("must exceed cmin ({} <= {})", p.cmax, p.cmin),
                    ));
                }
            }
        }
        Ok(())
    }

    fn kernel(&self) -> Kernel {
        match *self {
            Coupling::Linear(Linear { a, b }) => Kernel::Affine { a, b },
            Coupling::Scaling(Scaling { a }) => Kernel::Affine { a, b: 0.0 },
            Coupling::Difference(Difference { a }) => Kernel::Difference { a },
            Coupling::Sigmoidal(p) => Kernel::Sigmoidal {
                cmin: p.cmin,
                cmax: p.cmax,
                midpoint: p.midpoint,
                sigma: p.sigma,
                a: p.a,
            },
            Coupling::HyperbolicTangent(p) => Kernel::Tanh {
                a: p.a,
                b: p.b,
                midpoint: p.midpoint,
                sigma: p.sigma,
            },
            Coupling::Kuramoto(Kuramoto { a }) => Kernel::Kuramoto { a },
            Coupling::PreSigmoidal(p) => Kernel::PreSigmoidal(p),
            Coupling::SigmoidalJansenRit(p) => Kernel::JansenRit(p),
        }
    }

    /// Compute coupling input for every node
    ///
    /// # Arguments
    /// * `graph` - Non-zero edges per target node with their delays
    /// * `current` - Coupling variables of the current state, shape `(ncvar, N, M)`
    /// * `delayed` - Source of delayed coupling-variable values
    /// * `out` - Output, shape `(ncvar, N, M)`; fully overwritten
    /// * `parallel` - Evaluate target nodes concurrently
    ///
    /// Parameters are validated first, so an unconfigured function with an
    /// invalid domain returns `ParameterDomain` rather than evaluating.
    pub fn compute<D: DelayedStates + ?Sized>(
        &self,
        graph: &CouplingGraph,
        current: &StateArray,
        delayed: &D,
        out: &mut StateArray,
        parallel: bool,
    ) -> Result<()> {
        self.configure()?;
        let (ncvar, n_nodes, n_modes) = current.shape();
        if n_nodes != graph.n_nodes() {
            return Err(SimError::mismatch("coupling state nodes", graph.n_nodes(), n_nodes));
        }
        if out.shape() != current.shape() {
            return Err(SimError::mismatch("coupling output size", current.len(), out.len()));
        }
        if ncvar < self.required_coupling_variables() {
            return Err(SimError::mismatch(
                format!("{} coupling variables", self.name()),
                self.required_coupling_variables(),
                ncvar,
            ));
        }

        let kernel = self.kernel();
        let thresholds = match kernel {
            Kernel::PreSigmoidal(p) => pre_sigmoidal_thresholds(&p, current),
            _ => Vec::new(),
        };

        // Phase 1: per-target values, laid out [cvar * M + mode]
        let node_values = |i: usize| -> Vec<f64> {
            evaluate_node(&kernel, graph, current, delayed, &thresholds, i)
        };

        #[cfg(feature = "std")]
        let per_node: Vec<Vec<f64>> = if parallel {
            (0..n_nodes).into_par_iter().map(node_values).collect()
        } else {
            (0..n_nodes).map(node_values).collect()
        };
        #[cfg(not(feature = "std"))]
        let per_node: Vec<Vec<f64>> = {
            let _ = parallel;
            (0..n_nodes).map(node_values).collect()
        };

        // Phase 2: scatter
        for (i, values) in per_node.iter().enumerate() {
            for cv in 0..ncvar {
                for m in 0..n_modes {
                    out.set(cv, i, m, values[cv * n_modes + m]);
                }
            }
        }
        Ok(())
    }
}

/// Threshold per (node, mode), flattened as `node * M + mode`
fn pre_sigmoidal_thresholds(p: &PreSigmoidal, current: &StateArray) -> Vec<f64> {
    let (_, n_nodes, n_modes) = current.shape();
    if !p.dynamic {
        return vec![p.theta; n_nodes * n_modes];
    }
    let mut theta = Vec::with_capacity(n_nodes * n_modes);
    for i in 0..n_nodes {
        for m in 0..n_modes {
            theta.push(p.p * current.get(0, i, m) - current.get(1, i, m));
        }
    }
    if p.global_t && n_nodes > 0 {
        for m in 0..n_modes {
            let mean = (0..n_nodes).map(|i| theta[i * n_modes + m]).sum::<f64>() / n_nodes as f64;
            for i in 0..n_nodes {
                theta[i * n_modes + m] = mean;
            }
        }
    }
    theta
}

fn evaluate_node<D: DelayedStates + ?Sized>(
    kernel: &Kernel,
    graph: &CouplingGraph,
    current: &StateArray,
    delayed: &D,
    thresholds: &[f64],
    target: usize,
) -> Vec<f64> {
    let (ncvar, _, n_modes) = current.shape();
    let mut values = vec![0.0; ncvar * n_modes];

    match *kernel {
        Kernel::PreSigmoidal(p) => {
            for m in 0..n_modes {
                let theta = thresholds[target * n_modes + m];
                let mut sum = 0.0;
                for edge in graph.incoming(target) {
                    let x0 = delayed.delayed(target, edge.source, edge.delay, 0, m);
                    let x1 = delayed.delayed(target, edge.source, edge.delay, 1, m);
                    sum += edge.weight * kernels::pre_sigmoidal(x0, x1, theta, p.h, p.q, p.g, p.p);
                }
                values[m] = sum;
            }
        }
        Kernel::JansenRit(p) => {
            for m in 0..n_modes {
                let mut sum = 0.0;
                for edge in graph.incoming(target) {
                    let x0 = delayed.delayed(target, edge.source, edge.delay, 0, m);
                    let x1 = delayed.delayed(target, edge.source, edge.delay, 1, m);
                    sum += edge.weight
                        * kernels::jansen_rit_sigmoid(x0, x1, p.cmin, p.cmax, p.midpoint, p.r);
                }
                values[m] = p.a * sum;
            }
        }
        _ => {
            for cv in 0..ncvar {
                for m in 0..n_modes {
                    let x_i = current.get(cv, target, m);
                    let mut sum = 0.0;
                    for edge in graph.incoming(target) {
                        let x_j = delayed.delayed(target, edge.source, edge.delay, cv, m);
                        let pre = match *kernel {
                            Kernel::Difference { .. } => x_j - x_i,
                            Kernel::Kuramoto { .. } => (x_j - x_i).sin(),
                            _ => x_j,
                        };
                        sum += edge.weight * pre;
                    }
                    values[cv * n_modes + m] = post(kernel, sum);
                }
            }
        }
    }
    values
}

#[inline(always)]
fn post(kernel: &Kernel, sum: f64) -> f64 {
    match *kernel {
        Kernel::Affine { a, b } => a * sum + b,
        Kernel::Difference { a } | Kernel::Kuramoto { a } => a * sum,
        Kernel::Sigmoidal {
            cmin,
            cmax,
            midpoint,
            sigma,
            a,
        } => kernels::sigmoidal(sum, cmin, cmax, midpoint, sigma, a),
        Kernel::Tanh {
            a,
            b,
            midpoint,
            sigma,
        } => kernels::hyperbolic_tangent(sum, a, b, midpoint, sigma),
        Kernel::PreSigmoidal(_) | Kernel::JansenRit(_) => sum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupling::DenseDelayed;
    use crate::types::Connectivity;

    fn graph_2() -> CouplingGraph {
        let conn = Connectivity::new(
            vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            vec![vec![0.0; 2]; 2],
            1.0,
        )
        .unwrap();
        let delays = conn.delays_in_steps(1.0).unwrap();
        conn.sparse_rows(&delays).unwrap()
    }

    fn evaluate(coupling: &Coupling, current: &StateArray) -> StateArray {
        let delayed = DenseDelayed::from_current(current);
        let mut out = StateArray::zeros(current.n_vars(), current.n_nodes(), current.n_modes());
        coupling
            .compute(&graph_2(), current, &delayed, &mut out, false)
            .unwrap();
        out
    }

    fn all_variants() -> Vec<Coupling> {
        vec![
            Coupling::Linear(Linear::default()),
            Coupling::Scaling(Scaling::default()),
            Coupling::Difference(Difference::default()),
            Coupling::Sigmoidal(Sigmoidal::default()),
            Coupling::HyperbolicTangent(HyperbolicTangent::default()),
            Coupling::Kuramoto(Kuramoto::default()),
            Coupling::PreSigmoidal(PreSigmoidal::default()),
            Coupling::SigmoidalJansenRit(SigmoidalJansenRit::default()),
        ]
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Linear::default().a, 0.00390625);
        assert_eq!(Linear::default().b, 0.0);
        assert_eq!(Scaling::default().a, 0.00390625);
        assert_eq!(Difference::default().a, 0.1);
        let s = Sigmoidal::default();
        assert_eq!((s.cmin, s.cmax, s.midpoint, s.sigma, s.a), (-1.0, 1.0, 0.0, 230.0, 1.0));
        let p = PreSigmoidal::default();
        assert_eq!((p.h, p.q, p.g, p.p, p.theta), (0.5, 1.0, 60.0, 1.0, 0.5));
        assert!(p.dynamic && !p.global_t);
        let jr = SigmoidalJansenRit::default();
        assert_eq!((jr.cmin, jr.cmax, jr.midpoint, jr.r, jr.a), (0.0, 0.005, 6.0, 1.0, 0.56));
    }

    #[test]
    fn test_double_configure_is_idempotent() {
        let state = StateArray::from_rows(&[vec![0.3, -0.2], vec![0.1, 0.7]]).unwrap();
        for coupling in all_variants() {
            coupling.configure().unwrap();
            let first = evaluate(&coupling, &state);
            coupling.configure().unwrap();
            let second = evaluate(&coupling, &state);
            assert_eq!(first, second, "{}", coupling.name());
        }
    }

    #[test]
    fn test_linear_and_scaling() {
        let state = StateArray::from_rows(&[vec![1.0, 2.0]]).unwrap();
        let out = evaluate(&Coupling::Linear(Linear { a: 0.5, b: 1.0 }), &state);
        assert_eq!(out.as_slice(), &[0.5 * 2.0 + 1.0, 0.5 * 1.0 + 1.0]);
        let out = evaluate(&Coupling::Scaling(Scaling { a: 2.0 }), &state);
        assert_eq!(out.as_slice(), &[4.0, 2.0]);
    }

    #[test]
    fn test_difference_of_equal_states_is_zero() {
        let state = StateArray::filled(1, 2, 1, 3.25);
        let out = evaluate(&Coupling::Difference(Difference { a: 0.7 }), &state);
        assert_eq!(out.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn test_kuramoto_phase_difference() {
        let state = StateArray::from_rows(&[vec![0.0, 0.5]]).unwrap();
        let out = evaluate(&Coupling::Kuramoto(Kuramoto { a: 2.0 }), &state);
        assert_eq!(out.get(0, 0, 0), 2.0 * 0.5f64.sin());
        assert_eq!(out.get(0, 1, 0), 2.0 * (-0.5f64).sin());
    }

    #[test]
    fn test_sigmoidal_large_input_is_bounded() {
        let state = StateArray::filled(1, 2, 1, 1e6);
        let out = evaluate(&Coupling::Sigmoidal(Sigmoidal::default()), &state);
        for v in out.as_slice() {
            assert!(v.is_finite());
            assert!(*v >= -1.0 && *v <= 1.0);
        }
    }

    #[test]
    fn test_pre_sigmoidal_static_threshold() {
        let coupling = Coupling::PreSigmoidal(PreSigmoidal {
            dynamic: false,
            ..PreSigmoidal::default()
        });
        let state = StateArray::from_rows(&[vec![1.0, 0.8], vec![0.25, 0.1]]).unwrap();
        let out = evaluate(&coupling, &state);
        // Node 0 receives from node 1: 60 * (0.8 - 0.1 - 0.5)
        let expected = 0.5 * (1.0 + (60.0 * (0.8 - 0.1 - 0.5f64)).tanh());
        assert_eq!(out.get(0, 0, 0), expected);
        assert_eq!(out.get(1, 0, 0), 0.0);
        assert_eq!(out.get(1, 1, 0), 0.0);
    }

    #[test]
    fn test_pre_sigmoidal_dynamic_and_global_threshold() {
        let state = StateArray::from_rows(&[vec![1.0, 0.8], vec![0.25, 0.1]]).unwrap();
        let theta_0: f64 = 1.0 - 0.25;
        let theta_1: f64 = 0.8 - 0.1;

        let dynamic = evaluate(&Coupling::PreSigmoidal(PreSigmoidal::default()), &state);
        let expected_0 = 0.5 * (1.0 + (60.0 * (0.8 - 0.1 - theta_0)).tanh());
        assert_eq!(dynamic.get(0, 0, 0), expected_0);

        let global = evaluate(
            &Coupling::PreSigmoidal(PreSigmoidal {
                global_t: true,
                ..PreSigmoidal::default()
            }),
            &state,
        );
        let mean = (theta_0 + theta_1) / 2.0;
        let expected_1 = 0.5 * (1.0 + (60.0 * (1.0 - 0.25 - mean)).tanh());
        assert_eq!(global.get(0, 1, 0), expected_1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_coupling_json_carries_kind_tag() {
        let coupling = Coupling::PreSigmoidal(PreSigmoidal {
            global_t: true,
            ..PreSigmoidal::default()
        });
        let json = serde_json::to_value(coupling).unwrap();
        assert_eq!(json["kind"], "pre_sigmoidal");
        assert_eq!(json["globalT"], true);
        assert_eq!(serde_json::from_value::<Coupling>(json).unwrap(), coupling);

        // Missing parameters fall back to defaults
        let parsed: Coupling = serde_json::from_str(r#"{"kind": "difference"}"#).unwrap();
        assert_eq!(parsed, Coupling::Difference(Difference::default()));
    }

    #[test]
    fn test_unconfigured_inverted_range_is_rejected() {
        let coupling = Coupling::Sigmoidal(Sigmoidal {
            cmin: 1.0,
            cmax: -1.0,
            ..Sigmoidal::default()
        });
        let state = StateArray::filled(1, 2, 1, 0.5);
        let delayed = DenseDelayed::from_current(&state);
        let mut out = state.clone();
        let err = coupling
            .compute(&graph_2(), &state, &delayed, &mut out, false)
            .unwrap_err();
        assert_eq!(err.kind(), crate::types::ErrorKind::ParameterDomain);
    }

    #[test]
    fn test_two_variable_variants_require_two_cvars() {
        let state = StateArray::filled(1, 2, 1, 0.0);
        let delayed = DenseDelayed::from_current(&state);
        let mut out = state.clone();
        let coupling = Coupling::SigmoidalJansenRit(SigmoidalJansenRit::default());
        let err = coupling
            .compute(&graph_2(), &state, &delayed, &mut out, false)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_jansen_rit_writes_row_zero() {
        let state = StateArray::from_rows(&[vec![6.0, 6.0], vec![0.0, 0.0]]).unwrap();
        let out = evaluate(&Coupling::SigmoidalJansenRit(SigmoidalJansenRit::default()), &state);
        assert!((out.get(0, 0, 0) - 0.56 * 0.0025).abs() < 1e-15);
        assert_eq!(out.get(1, 0, 0), 0.0);
    }

    #[test]
    fn test_parameter_domain_errors() {
        let bad_sigma = Coupling::Sigmoidal(Sigmoidal {
            sigma: 0.0,
            ..Sigmoidal::default()
        });
        assert!(matches!(
            bad_sigma.configure(),
            Err(SimError::ParameterDomain { parameter: "sigma", .. })
        ));
        let bad_range = Coupling::Sigmoidal(Sigmoidal {
            cmin: 1.0,
            cmax: 1.0,
            ..Sigmoidal::default()
        });
        assert!(bad_range.configure().is_err());
        let bad_a = Coupling::Linear(Linear { a: f64::NAN, b: 0.0 });
        assert!(bad_a.configure().is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let n = 16;
        let conn = Connectivity::uniform(n, 0.3, 0.0, 1.0).unwrap();
        let graph = conn.sparse_rows(&conn.delays_in_steps(1.0).unwrap()).unwrap();
        let values: Vec<f64> = (0..2 * n * 3).map(|k| (k as f64 * 0.37).sin()).collect();
        let state = StateArray::from_vec(2, n, 3, values).unwrap();
        let delayed = DenseDelayed::from_current(&state);
        for coupling in all_variants() {
            let mut seq = StateArray::zeros(2, n, 3);
            let mut par = StateArray::zeros(2, n, 3);
            coupling.compute(&graph, &state, &delayed, &mut seq, false).unwrap();
            coupling.compute(&graph, &state, &delayed, &mut par, true).unwrap();
            assert_eq!(seq, par, "{}", coupling.name());
        }
    }
}
