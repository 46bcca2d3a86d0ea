// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 */

//! Structural connectivity
//!
//! A [`Connectivity`] holds the weighted, delayed graph between network nodes.
//! Row `i` of every matrix describes the inputs of node `i`: `weights[i][j]`
//! is the strength with which node `j` drives node `i`, and the matching tract
//! length sets the conduction delay of that signal.
//!
//! The engine never walks the dense matrices on the hot path. At configure
//! time the connectivity is compressed into a [`CouplingGraph`] (CSR of the
//! non-zero edges per target node, each edge carrying its delay in steps).

use super::error::{Result, SimError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Weight normalisation applied before simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeightScaling {
    /// Weights used as given
    #[default]
    None,
    /// Divide every weight by the largest absolute weight
    Tract,
    /// Divide every weight by the largest row sum (in-strength)
    Region,
}

/// Weighted, delayed network connectivity
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Connectivity {
    n_nodes: usize,
    /// Row-major N x N, `weights[i * N + j]` is j -> i
    weights: Vec<f64>,
    /// Row-major N x N, same orientation as `weights`
    tract_lengths: Vec<f64>,
    /// Conduction speed (length units per time unit)
    speed: f64,
    region_labels: Option<Vec<String>>,
}

impl Connectivity {
    /// Build connectivity from nested row vectors
    ///
    /// Fails if the matrices are not square, differ in size, contain
    /// non-finite or negative entries, or if `speed` is not positive.
    pub fn new(weights: Vec<Vec<f64>>, tract_lengths: Vec<Vec<f64>>, speed: f64) -> Result<Self> {
        let n = weights.len();
        let weights = flatten_square("weights", weights, n)?;
        let tract_lengths = flatten_square("tract_lengths", tract_lengths, n)?;
        let conn = Self {
            n_nodes: n,
            weights,
            tract_lengths,
            speed,
            region_labels: None,
        };
        conn.validate()?;
        Ok(conn)
    }

    /// Fully connected network with uniform weight and tract length, no self loops
    pub fn uniform(n_nodes: usize, weight: f64, tract_length: f64, speed: f64) -> Result<Self> {
        let mut weights = vec![vec![weight; n_nodes]; n_nodes];
        let mut tracts = vec![vec![tract_length; n_nodes]; n_nodes];
        for i in 0..n_nodes {
            weights[i][i] = 0.0;
            tracts[i][i] = 0.0;
        }
        Self::new(weights, tracts, speed)
    }

    pub fn with_region_labels(mut self, labels: Vec<String>) -> Result<Self> {
        if labels.len() != self.n_nodes {
            return Err(SimError::mismatch("region labels", self.n_nodes, labels.len()));
        }
        self.region_labels = Some(labels);
        Ok(self)
    }

    /// Re-check every structural invariant
    pub fn validate(&self) -> Result<()> {
        let expected = self.n_nodes * self.n_nodes;
        if self.weights.len() != expected {
            return Err(SimError::mismatch("weights", expected, self.weights.len()));
        }
        if self.tract_lengths.len() != expected {
            return Err(SimError::mismatch(
                "tract_lengths",
                expected,
                self.tract_lengths.len(),
            ));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(SimError::Configuration(format!(
                "conduction speed must be positive and finite, got {}",
                self.speed
            )));
        }
        check_entries("weights", &self.weights, self.n_nodes)?;
        check_entries("tract_lengths", &self.tract_lengths, self.n_nodes)?;
        Ok(())
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Replace the conduction speed
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(SimError::Configuration(format!(
                "conduction speed must be positive and finite, got {}",
                speed
            )));
        }
        self.speed = speed;
        Ok(())
    }

    /// Weight with which `source` drives `target`
    #[inline]
    pub fn weight(&self, target: usize, source: usize) -> f64 {
        self.weights[target * self.n_nodes + source]
    }

    #[inline]
    pub fn tract_length(&self, target: usize, source: usize) -> f64 {
        self.tract_lengths[target * self.n_nodes + source]
    }

    pub fn region_labels(&self) -> Option<&[String]> {
        self.region_labels.as_deref()
    }

    /// Number of edges with non-zero weight
    pub fn edge_count(&self) -> usize {
        self.weights.iter().filter(|w| **w != 0.0).count()
    }

    /// Convert tract lengths to integer delays for time step `dt`
    ///
    /// `delay_steps = round(tract_length / speed / dt)`
    pub fn delays_in_steps(&self, dt: f64) -> Result<DelayMatrix> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::domain("Connectivity", "dt", format!("must be positive, got {}", dt)));
        }
        let mut steps = Vec::with_capacity(self.tract_lengths.len());
        let mut max_delay = 0usize;
        for &length in &self.tract_lengths {
            let raw = (length / self.speed / dt).round();
            if !raw.is_finite() || raw > u32::MAX as f64 {
                return Err(SimError::Configuration(format!(
                    "delay of {} steps is not representable",
                    raw
                )));
            }
            let d = raw as usize;
            max_delay = max_delay.max(d);
            steps.push(d);
        }
        Ok(DelayMatrix {
            n_nodes: self.n_nodes,
            steps,
            max_delay,
        })
    }

    /// Compress into per-target lists of non-zero edges with their delays
    pub fn sparse_rows(&self, delays: &DelayMatrix) -> Result<CouplingGraph> {
        if delays.n_nodes != self.n_nodes {
            return Err(SimError::mismatch("delay matrix", self.n_nodes, delays.n_nodes));
        }
        let mut row_offsets = Vec::with_capacity(self.n_nodes + 1);
        let mut sources = Vec::new();
        let mut weights = Vec::new();
        let mut edge_delays = Vec::new();
        row_offsets.push(0);
        for target in 0..self.n_nodes {
            for source in 0..self.n_nodes {
                let w = self.weight(target, source);
                if w != 0.0 {
                    sources.push(source);
                    weights.push(w);
                    edge_delays.push(delays.get(target, source));
                }
            }
            row_offsets.push(sources.len());
        }
        Ok(CouplingGraph {
            n_nodes: self.n_nodes,
            row_offsets,
            sources,
            weights,
            delays: edge_delays,
        })
    }

    /// Copy with normalised weights; an all-zero matrix is left unchanged
    pub fn scaled(&self, mode: WeightScaling) -> Connectivity {
        let divisor = match mode {
            WeightScaling::None => 1.0,
            WeightScaling::Tract => self.weights.iter().fold(0.0f64, |m, w| m.max(w.abs())),
            WeightScaling::Region => (0..self.n_nodes)
                .map(|i| self.weights[i * self.n_nodes..(i + 1) * self.n_nodes].iter().sum::<f64>())
                .fold(0.0f64, f64::max),
        };
        let mut out = self.clone();
        if divisor > 0.0 && divisor != 1.0 {
            out.weights.iter_mut().for_each(|w| *w /= divisor);
        }
        out
    }
}

fn flatten_square(what: &str, rows: Vec<Vec<f64>>, n: usize) -> Result<Vec<f64>> {
    if rows.len() != n {
        return Err(SimError::mismatch(format!("{} rows", what), n, rows.len()));
    }
    let mut flat = Vec::with_capacity(n * n);
    for row in rows {
        if row.len() != n {
            return Err(SimError::mismatch(format!("{} columns", what), n, row.len()));
        }
        flat.extend(row);
    }
    Ok(flat)
}

fn check_entries(what: &str, values: &[f64], n: usize) -> Result<()> {
    for (idx, &v) in values.iter().enumerate() {
        if !v.is_finite() || v < 0.0 {
            return Err(SimError::Configuration(format!(
                "{}[{}][{}] = {} must be finite and non-negative",
                what,
                idx / n.max(1),
                idx % n.max(1),
                v
            )));
        }
    }
    Ok(())
}

/// Integer conduction delays, in steps, with the same orientation as the weights
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayMatrix {
    n_nodes: usize,
    steps: Vec<usize>,
    max_delay: usize,
}

impl DelayMatrix {
    /// Delay of the signal from `source` to `target`
    #[inline]
    pub fn get(&self, target: usize, source: usize) -> usize {
        self.steps[target * self.n_nodes + source]
    }

    #[inline]
    pub fn max_delay(&self) -> usize {
        self.max_delay
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }
}

/// CSR adjacency of non-zero edges grouped by target node
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingGraph {
    n_nodes: usize,
    row_offsets: Vec<usize>,
    sources: Vec<usize>,
    weights: Vec<f64>,
    delays: Vec<usize>,
}

/// One incoming edge of a target node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub source: usize,
    pub weight: f64,
    pub delay: usize,
}

impl CouplingGraph {
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    pub fn edge_count(&self) -> usize {
        self.sources.len()
    }

    /// Incoming edges of `target`, in ascending source order
    #[inline]
    pub fn incoming(&self, target: usize) -> impl Iterator<Item = Edge> + '_ {
        let range = self.row_offsets[target]..self.row_offsets[target + 1];
        range.map(move |k| Edge {
            source: self.sources[k],
            weight: self.weights[k],
            delay: self.delays[k],
        })
    }

    pub fn max_delay(&self) -> usize {
        self.delays.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node() -> Connectivity {
        Connectivity::new(
            vec![vec![0.0, 1.0], vec![0.5, 0.0]],
            vec![vec![0.0, 8.0], vec![8.0, 0.0]],
            4.0,
        )
        .unwrap()
    }

    #[test]
    fn test_delays_in_steps() {
        let conn = two_node();
        // 8 / 4 / 0.5 = 4 steps
        let delays = conn.delays_in_steps(0.5).unwrap();
        assert_eq!(delays.get(0, 1), 4);
        assert_eq!(delays.get(0, 0), 0);
        assert_eq!(delays.max_delay(), 4);
    }

    #[test]
    fn test_delay_rounding() {
        let conn = Connectivity::new(
            vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            vec![vec![0.0, 1.3], vec![1.7, 0.0]],
            1.0,
        )
        .unwrap();
        let delays = conn.delays_in_steps(1.0).unwrap();
        assert_eq!(delays.get(0, 1), 1);
        assert_eq!(delays.get(1, 0), 2);
    }

    #[test]
    fn test_validation() {
        assert!(Connectivity::new(vec![vec![0.0, 1.0]], vec![vec![0.0, 1.0]], 1.0).is_err());
        assert!(Connectivity::new(vec![vec![-1.0]], vec![vec![0.0]], 1.0).is_err());
        assert!(Connectivity::new(vec![vec![f64::NAN]], vec![vec![0.0]], 1.0).is_err());
        assert!(Connectivity::new(vec![vec![1.0]], vec![vec![0.0]], 0.0).is_err());
        assert!(Connectivity::new(vec![vec![1.0]], vec![vec![0.0], vec![0.0]], 1.0).is_err());
    }

    #[test]
    fn test_sparse_rows_skips_zero_weights() {
        let conn = two_node();
        let delays = conn.delays_in_steps(0.5).unwrap();
        let graph = conn.sparse_rows(&delays).unwrap();
        assert_eq!(graph.edge_count(), 2);
        let incoming: Vec<Edge> = graph.incoming(1).collect();
        assert_eq!(
            incoming,
            vec![Edge {
                source: 0,
                weight: 0.5,
                delay: 4
            }]
        );
        assert_eq!(graph.max_delay(), 4);
    }

    #[test]
    fn test_weight_scaling() {
        let conn = Connectivity::new(
            vec![vec![0.0, 2.0, 2.0], vec![4.0, 0.0, 0.0], vec![1.0, 0.0, 0.0]],
            vec![vec![0.0; 3]; 3],
            1.0,
        )
        .unwrap();

        let tract = conn.scaled(WeightScaling::Tract);
        assert_eq!(tract.weight(1, 0), 1.0);
        assert_eq!(tract.weight(0, 1), 0.5);

        // Row sums are 4, 4, 1
        let region = conn.scaled(WeightScaling::Region);
        assert_eq!(region.weight(0, 1), 0.5);
        assert_eq!(region.weight(2, 0), 0.25);

        let zeros = Connectivity::uniform(3, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(zeros.scaled(WeightScaling::Region), zeros);
    }

    #[test]
    fn test_region_labels_length_checked() {
        let conn = two_node();
        assert!(conn.clone().with_region_labels(vec!["a".into()]).is_err());
        let labelled = conn.with_region_labels(vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(labelled.region_labels().unwrap()[1], "b");
    }
}
