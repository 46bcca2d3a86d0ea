// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Monitors
//!
//! A monitor observes the state after every step and emits a sample every
//! `istep = period / dt` steps:
//!
//! | Kind              | Emits                                           | Time stamp               |
//! |-------------------|-------------------------------------------------|--------------------------|
//! | `Raw`             | all state variables, every step                 | `step * dt`              |
//! | `SubSample`       | variables of interest at the sampling step      | `step * dt`              |
//! | `TemporalAverage` | mean over the last `istep` steps                | `(step - istep/2) * dt`  |
//! | `GlobalAverage`   | node mean of the temporal average               | `(step - istep/2) * dt`  |
//! | `Eeg`/`Meg`/`Ieeg`| temporal average projected onto sensors         | `(step - istep/2) * dt`  |
//!
//! Monitors only read the state, so the simulator may sample them
//! concurrently.

pub mod projection;

pub use projection::{EegReference, RegionMapping, SensorProjection};

use serde::{Deserialize, Serialize};
use tracing::debug;
use vbrain_sim_neural::{LocalDynamics, Result, SimError, StateArray};

/// Relative tolerance for `period` being an integer multiple of `dt`
pub const PERIOD_TOLERANCE: f64 = 1e-6;

/// One emitted observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSample {
    pub time: f64,
    /// Shape `(variables, nodes or sensors, modes)`
    pub data: StateArray,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MonitorKind {
    Raw,
    SubSample,
    TemporalAverage,
    GlobalAverage,
    Eeg {
        projection: SensorProjection,
        reference: EegReference,
    },
    Meg(SensorProjection),
    Ieeg(SensorProjection),
}

impl MonitorKind {
    fn averages(&self) -> bool {
        !matches!(self, MonitorKind::Raw | MonitorKind::SubSample)
    }

    fn projection(&self) -> Option<&SensorProjection> {
        match self {
            MonitorKind::Eeg { projection, .. }
            | MonitorKind::Meg(projection)
            | MonitorKind::Ieeg(projection) => Some(projection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Monitor {
    kind: MonitorKind,
    period: f64,
    /// Requested variables (None = model's variables of interest)
    variables: Option<Vec<usize>>,
    // Derived by configure()
    vars: Vec<usize>,
    istep: u64,
    dt: f64,
    configured: bool,
    accumulator: Option<StateArray>,
    count: u64,
}

impl Monitor {
    fn with_kind(kind: MonitorKind, period: f64) -> Self {
        Self {
            kind,
            period,
            variables: None,
            vars: Vec::new(),
            istep: 0,
            dt: 0.0,
            configured: false,
            accumulator: None,
            count: 0,
        }
    }

    /// Every step, every state variable
    pub fn raw() -> Self {
        Self::with_kind(MonitorKind::Raw, 0.0)
    }

    pub fn sub_sample(period: f64) -> Self {
        Self::with_kind(MonitorKind::SubSample, period)
    }

    pub fn temporal_average(period: f64) -> Self {
        Self::with_kind(MonitorKind::TemporalAverage, period)
    }

    pub fn global_average(period: f64) -> Self {
        Self::with_kind(MonitorKind::GlobalAverage, period)
    }

    pub fn eeg(period: f64, projection: SensorProjection, reference: EegReference) -> Self {
        Self::with_kind(
            MonitorKind::Eeg {
                projection,
                reference,
            },
            period,
        )
    }

    pub fn meg(period: f64, projection: SensorProjection) -> Self {
        Self::with_kind(MonitorKind::Meg(projection), period)
    }

    pub fn ieeg(period: f64, projection: SensorProjection) -> Self {
        Self::with_kind(MonitorKind::Ieeg(projection), period)
    }

    /// Record these state variables instead of the model's defaults
    ///
    /// Ignored by `Raw`, which always records everything.
    pub fn with_variables(mut self, variables: Vec<usize>) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            MonitorKind::Raw => "Raw",
            MonitorKind::SubSample => "SubSample",
            MonitorKind::TemporalAverage => "TemporalAverage",
            MonitorKind::GlobalAverage => "GlobalAverage",
            MonitorKind::Eeg { .. } => "EEG",
            MonitorKind::Meg(_) => "MEG",
            MonitorKind::Ieeg(_) => "iEEG",
        }
    }

    pub fn kind(&self) -> &MonitorKind {
        &self.kind
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Steps between samples (0 until configured)
    pub fn istep(&self) -> u64 {
        self.istep
    }

    /// Recorded state variables (empty until configured)
    pub fn variables(&self) -> &[usize] {
        &self.vars
    }

    /// Derive `istep` and the recorded variables for a model and step size
    pub fn configure(&mut self, dt: f64, model: &dyn LocalDynamics, n_nodes: usize) -> Result<()> {
        self.configured = false;
        let nvar = model.nvar();

        if self.kind == MonitorKind::Raw {
            self.period = dt;
            self.istep = 1;
            self.vars = (0..nvar).collect();
        } else {
            self.istep = period_to_steps(self.name(), self.period, dt)?;
            let vars = match &self.variables {
                Some(v) => v.clone(),
                None => model.variables_of_interest(),
            };
            if vars.is_empty() {
                return Err(SimError::Configuration(format!(
                    "monitor '{}' records no variables",
                    self.name()
                )));
            }
            if let Some(&bad) = vars.iter().find(|&&v| v >= nvar) {
                return Err(SimError::Configuration(format!(
                    "monitor '{}' variable {} out of range for {} state variables",
                    self.name(),
                    bad,
                    nvar
                )));
            }
            self.vars = vars;
        }

        if let Some(projection) = self.kind.projection() {
            projection.validate(n_nodes)?;
        }
        if let MonitorKind::Eeg {
            projection,
            reference,
        } = &self.kind
        {
            reference.validate(projection.n_sensors())?;
        }

        self.dt = dt;
        self.configured = true;
        self.reset();
        debug!(
            monitor = self.name(),
            istep = self.istep,
            variables = ?self.vars,
            "Monitor configured"
        );
        Ok(())
    }

    /// Clear accumulated partial windows
    pub fn reset(&mut self) {
        self.accumulator = None;
        self.count = 0;
    }

    /// Observe the state reached at `step`
    ///
    /// `step` counts completed integration steps, starting at 1.
    pub fn sample(&mut self, step: u64, state: &StateArray) -> Result<Option<MonitorSample>> {
        if !self.configured {
            return Err(SimError::InvalidState {
                expected: "configured monitor",
                actual: "unconfigured monitor",
            });
        }
        let due = step % self.istep == 0;

        if !self.kind.averages() {
            if !due {
                return Ok(None);
            }
            return Ok(Some(MonitorSample {
                time: step as f64 * self.dt,
                data: state.select_variables(&self.vars)?,
            }));
        }

        let selected = state.select_variables(&self.vars)?;
        match &mut self.accumulator {
            Some(acc) => acc.add_scaled(1.0, &selected),
            None => self.accumulator = Some(selected),
        }
        self.count += 1;
        if !due {
            return Ok(None);
        }

        let Some(mut mean) = self.accumulator.take() else {
            return Ok(None);
        };
        let count = self.count as f64;
        mean.as_mut_slice().iter_mut().for_each(|v| *v /= count);
        self.count = 0;

        let time = (step as f64 - self.istep as f64 / 2.0) * self.dt;
        let data = match &self.kind {
            MonitorKind::GlobalAverage => node_mean(&mean),
            MonitorKind::Eeg {
                projection,
                reference,
            } => project(&mean, projection, Some(reference)),
            MonitorKind::Meg(projection) | MonitorKind::Ieeg(projection) => {
                project(&mean, projection, None)
            }
            _ => mean,
        };
        Ok(Some(MonitorSample { time, data }))
    }
}

/// `round(period / dt)`, rejecting periods that are not whole multiples
pub fn period_to_steps(monitor: &str, period: f64, dt: f64) -> Result<u64> {
    let invalid = || SimError::InvalidMonitorPeriod {
        monitor: monitor.to_string(),
        period,
        dt,
    };
    if !(period.is_finite() && period > 0.0 && dt.is_finite() && dt > 0.0) {
        return Err(invalid());
    }
    let istep = (period / dt).round();
    if istep < 1.0 || (istep * dt - period).abs() > PERIOD_TOLERANCE * period {
        return Err(invalid());
    }
    Ok(istep as u64)
}

fn node_mean(mean: &StateArray) -> StateArray {
    let (n_vars, n_nodes, n_modes) = mean.shape();
    let mut out = StateArray::zeros(n_vars, 1, n_modes);
    for v in 0..n_vars {
        for m in 0..n_modes {
            let sum: f64 = (0..n_nodes).map(|n| mean.get(v, n, m)).sum();
            out.set(v, 0, m, sum / n_nodes as f64);
        }
    }
    out
}

fn project(
    mean: &StateArray,
    projection: &SensorProjection,
    reference: Option<&EegReference>,
) -> StateArray {
    let (n_vars, n_nodes, n_modes) = mean.shape();
    let mut out = StateArray::zeros(n_vars, projection.n_sensors(), n_modes);
    let mut column = vec![0.0; n_nodes];
    for v in 0..n_vars {
        for m in 0..n_modes {
            for (n, value) in column.iter_mut().enumerate() {
                *value = mean.get(v, n, m);
            }
            let mut sensors = projection.project(&column);
            if let Some(reference) = reference {
                reference.apply(&mut sensors);
            }
            for (s, value) in sensors.into_iter().enumerate() {
                out.set(v, s, m, value);
            }
        }
    }
    out
}
