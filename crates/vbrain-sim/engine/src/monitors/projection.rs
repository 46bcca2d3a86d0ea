// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sensor-space projection for EEG/MEG/intracranial monitors
//!
//! A projection is a `sensors x columns` gain matrix. Columns are either the
//! simulated nodes themselves, or brain regions when a [`RegionMapping`]
//! averages nodes into regions first.

use vbrain_sim_neural::{Result, SimError};

/// Node-to-region assignment
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMapping {
    mapping: Vec<usize>,
    n_regions: usize,
    /// Nodes per region, cached for averaging
    counts: Vec<usize>,
}

impl RegionMapping {
    pub fn new(mapping: Vec<usize>, n_regions: usize) -> Result<Self> {
        if let Some(&bad) = mapping.iter().find(|&&r| r >= n_regions) {
            return Err(SimError::Configuration(format!(
                "region mapping index {} out of range for {} regions",
                bad, n_regions
            )));
        }
        let mut counts = vec![0; n_regions];
        for &region in &mapping {
            counts[region] += 1;
        }
        Ok(Self {
            mapping,
            n_regions,
            counts,
        })
    }

    pub fn n_regions(&self) -> usize {
        self.n_regions
    }

    /// Number of nodes mapped
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn region_of(&self, node: usize) -> usize {
        self.mapping[node]
    }

    /// Mean of node values per region; regions without nodes read 0
    pub fn average(&self, node_values: &[f64]) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_regions];
        for (&region, value) in self.mapping.iter().zip(node_values) {
            sums[region] += value;
        }
        for (sum, &count) in sums.iter_mut().zip(&self.counts) {
            if count > 0 {
                *sum /= count as f64;
            }
        }
        sums
    }
}

/// Re-referencing applied to EEG channels after projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EegReference {
    #[default]
    None,
    /// Subtract the mean over all sensors
    Average,
    /// Subtract the given sensor's signal
    Channel(usize),
}

/// Gain matrix plus optional region mapping and sensor metadata
#[derive(Debug, Clone, PartialEq)]
pub struct SensorProjection {
    /// Row-major `n_sensors x n_columns`
    gain: Vec<f64>,
    n_sensors: usize,
    n_columns: usize,
    region_mapping: Option<RegionMapping>,
    labels: Vec<String>,
    positions: Vec<[f64; 3]>,
}

impl SensorProjection {
    pub fn new(gain: Vec<Vec<f64>>) -> Result<Self> {
        let n_sensors = gain.len();
        if n_sensors == 0 {
            return Err(SimError::Configuration(
                "projection needs at least one sensor".into(),
            ));
        }
        let n_columns = gain[0].len();
        let mut flat = Vec::with_capacity(n_sensors * n_columns);
        for row in gain {
            if row.len() != n_columns {
                return Err(SimError::mismatch("projection row", n_columns, row.len()));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(SimError::Configuration(
                    "projection gain contains non-finite values".into(),
                ));
            }
            flat.extend(row);
        }
        Ok(Self {
            gain: flat,
            n_sensors,
            n_columns,
            region_mapping: None,
            labels: Vec::new(),
            positions: Vec::new(),
        })
    }

    /// Project through regions instead of nodes
    pub fn with_region_mapping(mut self, mapping: RegionMapping) -> Result<Self> {
        if mapping.n_regions() != self.n_columns {
            return Err(SimError::mismatch(
                "projection columns (regions)",
                mapping.n_regions(),
                self.n_columns,
            ));
        }
        self.region_mapping = Some(mapping);
        Ok(self)
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Result<Self> {
        if labels.len() != self.n_sensors {
            return Err(SimError::mismatch("sensor labels", self.n_sensors, labels.len()));
        }
        self.labels = labels;
        Ok(self)
    }

    pub fn with_positions(mut self, positions: Vec<[f64; 3]>) -> Result<Self> {
        if positions.len() != self.n_sensors {
            return Err(SimError::mismatch(
                "sensor positions",
                self.n_sensors,
                positions.len(),
            ));
        }
        self.positions = positions;
        Ok(self)
    }

    pub fn n_sensors(&self) -> usize {
        self.n_sensors
    }

    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    pub fn region_mapping(&self) -> Option<&RegionMapping> {
        self.region_mapping.as_ref()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    /// Check the projection fits a network of `n_nodes`
    pub fn validate(&self, n_nodes: usize) -> Result<()> {
        match &self.region_mapping {
            Some(mapping) => {
                if mapping.len() != n_nodes {
                    return Err(SimError::mismatch("region mapping length", n_nodes, mapping.len()));
                }
            }
            None => {
                if self.n_columns != n_nodes {
                    return Err(SimError::mismatch("projection columns", n_nodes, self.n_columns));
                }
            }
        }
        Ok(())
    }

    /// Sensor values for one variable/mode slice of node values
    pub fn project(&self, node_values: &[f64]) -> Vec<f64> {
        let averaged;
        let columns = match &self.region_mapping {
            Some(mapping) => {
                averaged = mapping.average(node_values);
                &averaged[..]
            }
            None => node_values,
        };
        self.gain
            .chunks_exact(self.n_columns)
            .map(|row| row.iter().zip(columns).map(|(g, x)| g * x).sum())
            .collect()
    }
}

impl EegReference {
    pub(crate) fn validate(&self, n_sensors: usize) -> Result<()> {
        if let EegReference::Channel(k) = *self {
            if k >= n_sensors {
                return Err(SimError::Configuration(format!(
                    "reference channel {} out of range for {} sensors",
                    k, n_sensors
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn apply(&self, sensors: &mut [f64]) {
        let reference = match *self {
            EegReference::None => return,
            EegReference::Average => sensors.iter().sum::<f64>() / sensors.len() as f64,
            EegReference::Channel(k) => sensors[k],
        };
        sensors.iter_mut().for_each(|s| *s -= reference);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_nodes() {
        let projection = SensorProjection::new(vec![vec![1.0, 2.0], vec![0.5, -1.0]]).unwrap();
        assert!(projection.validate(2).is_ok());
        assert_eq!(projection.project(&[3.0, 4.0]), vec![11.0, -2.5]);
    }

    #[test]
    fn test_project_through_regions() {
        // nodes 0,1 -> region 0; node 2 -> region 1
        let mapping = RegionMapping::new(vec![0, 0, 1], 2).unwrap();
        let projection = SensorProjection::new(vec![vec![1.0, 10.0]])
            .unwrap()
            .with_region_mapping(mapping)
            .unwrap();
        assert!(projection.validate(3).is_ok());
        assert!(projection.validate(2).is_err());
        assert_eq!(projection.project(&[2.0, 4.0, 1.0]), vec![3.0 + 10.0]);
    }

    #[test]
    fn test_mapping_validation() {
        assert!(RegionMapping::new(vec![0, 2], 2).is_err());
        let mapping = RegionMapping::new(vec![0, 1, 1], 3).unwrap();
        assert_eq!(mapping.average(&[1.0, 2.0, 4.0]), vec![1.0, 3.0, 0.0]);
        let projection = SensorProjection::new(vec![vec![1.0, 1.0]]).unwrap();
        assert!(projection.with_region_mapping(mapping).is_err());
    }

    #[test]
    fn test_ragged_gain_rejected() {
        assert!(SensorProjection::new(vec![vec![1.0, 2.0], vec![1.0]]).is_err());
        assert!(SensorProjection::new(vec![]).is_err());
    }

    #[test]
    fn test_metadata_lengths() {
        let projection = SensorProjection::new(vec![vec![1.0], vec![2.0]]).unwrap();
        assert!(projection.clone().with_labels(vec!["Fz".into()]).is_err());
        let projection = projection
            .with_labels(vec!["Fz".into(), "Cz".into()])
            .unwrap()
            .with_positions(vec![[0.0, 0.1, 0.9], [0.0, 0.0, 1.0]])
            .unwrap();
        assert_eq!(projection.labels()[1], "Cz");
        assert_eq!(projection.positions().len(), 2);
    }

    #[test]
    fn test_eeg_reference() {
        let mut sensors = vec![1.0, 2.0, 6.0];
        EegReference::Average.apply(&mut sensors);
        assert_eq!(sensors, vec![-2.0, -1.0, 3.0]);

        let mut sensors = vec![1.0, 2.0, 6.0];
        EegReference::Channel(1).apply(&mut sensors);
        assert_eq!(sensors, vec![-1.0, 0.0, 4.0]);
        assert!(EegReference::Channel(3).validate(3).is_err());
    }
}
