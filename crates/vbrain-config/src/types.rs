// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `vbrain_simulation.toml`. Component parameters left out of the file stay
//! `None` here and take the component's own defaults when the engine builds it.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub simulation: SimulationSection,
    pub connectivity: ConnectivitySection,
    pub coupling: CouplingConfig,
    pub integrator: IntegratorConfig,
    pub monitors: Vec<MonitorConfig>,
    pub runtime: RuntimeSection,
    pub logging: LoggingSection,
}

/// Time stepping and run-level settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Integration step
    pub dt: f64,
    /// Total simulated time (same unit as `dt`)
    pub simulation_length: f64,
    /// Seed for random initial conditions
    pub seed: u64,
    /// Check the state for NaN/Inf every N steps (0 = never)
    pub check_finite_interval: u64,
    /// Local (self) coupling strength passed to the model
    pub local_coupling_strength: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            dt: 0.0625,
            simulation_length: 1000.0,
            seed: 42,
            check_finite_interval: 0,
            local_coupling_strength: 0.0,
        }
    }
}

/// Weight normalisation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightScalingConfig {
    #[default]
    None,
    Tract,
    Region,
}

/// Connectivity settings that do not need external data
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectivitySection {
    /// Conduction speed (length units per time unit)
    pub speed: f64,
    pub weight_scaling: WeightScalingConfig,
}

impl Default for ConnectivitySection {
    fn default() -> Self {
        Self {
            speed: 4.0,
            weight_scaling: WeightScalingConfig::None,
        }
    }
}

/// Long-range coupling function, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CouplingConfig {
    Linear {
        a: Option<f64>,
        b: Option<f64>,
    },
    Scaling {
        a: Option<f64>,
    },
    Difference {
        a: Option<f64>,
    },
    Sigmoidal {
        cmin: Option<f64>,
        cmax: Option<f64>,
        midpoint: Option<f64>,
        sigma: Option<f64>,
        a: Option<f64>,
    },
    HyperbolicTangent {
        a: Option<f64>,
        b: Option<f64>,
        midpoint: Option<f64>,
        sigma: Option<f64>,
    },
    Kuramoto {
        a: Option<f64>,
    },
    PreSigmoidal {
        #[serde(rename = "H")]
        h: Option<f64>,
        #[serde(rename = "Q")]
        q: Option<f64>,
        #[serde(rename = "G")]
        g: Option<f64>,
        #[serde(rename = "P")]
        p: Option<f64>,
        theta: Option<f64>,
        dynamic: Option<bool>,
        #[serde(rename = "globalT")]
        global_t: Option<bool>,
    },
    SigmoidalJansenRit {
        cmin: Option<f64>,
        cmax: Option<f64>,
        midpoint: Option<f64>,
        r: Option<f64>,
        a: Option<f64>,
    },
}

impl Default for CouplingConfig {
    fn default() -> Self {
        CouplingConfig::Linear { a: None, b: None }
    }
}

/// Integration scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorScheme {
    Euler,
    #[default]
    Heun,
    RungeKutta4,
    EulerMaruyama,
    HeunStochastic,
}

impl IntegratorScheme {
    pub fn is_stochastic(&self) -> bool {
        matches!(self, Self::EulerMaruyama | Self::HeunStochastic)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct IntegratorConfig {
    pub scheme: IntegratorScheme,
    /// Used only by stochastic schemes
    pub noise: NoiseConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    #[default]
    Additive,
    Multiplicative,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub kind: NoiseKind,
    /// Noise intensity: one value, or one per state variable
    pub nsig: Vec<f64>,
    pub seed: u64,
    /// Multiplicative noise: `g(x) = sqrt(2 nsig) (slope x + intercept)`
    pub slope: f64,
    pub intercept: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Additive,
            nsig: vec![1.0],
            seed: 42,
            slope: 1.0,
            intercept: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorKind {
    Raw,
    SubSample,
    #[default]
    TemporalAverage,
    GlobalAverage,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub kind: MonitorKind,
    /// Sampling period (ignored by `raw`)
    pub period: f64,
    /// State variable indices to record (None = model defaults)
    pub variables: Option<Vec<usize>>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            kind: MonitorKind::TemporalAverage,
            period: 0.9765625,
            variables: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeSection {
    /// Worker threads (0 = auto-detect, 1 = sequential)
    pub num_threads: usize,
    /// Node count at which intra-step parallelism is enabled
    pub parallel_threshold: usize,
    pub history_memory_limit_mb: u64,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            num_threads: 0,
            parallel_threshold: 256,
            history_memory_limit_mb: 4096,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}
