// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # vbrain - Delay-Coupled Brain Network Simulation
//!
//! vbrain integrates a network of coupled nonlinear oscillators, one per brain
//! region, interacting through a weighted connectome with conduction delays.
//! This crate re-exports the workspace members behind one dependency.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! vbrain = "0.1"  # Default: config bridge enabled
//! ```
//!
//! ## Feature Flags
//!
//! - **`config`** (default): build simulators from a TOML `SimulationConfig`
//! - **`file-logging`**: per-crate rolling log files
//!
//! ## Usage
//!
//! ```rust
//! use vbrain::prelude::*;
//!
//! let connectivity = Connectivity::uniform(8, 0.5, 16.0, 4.0)?;
//! let mut sim = Simulator::new(
//!     Box::new(Generic2dOscillator::default()),
//!     connectivity,
//!     Coupling::Linear(Linear { a: 0.0152, b: 0.0 }),
//!     Integrator::heun_stochastic(0.0625, Noise::additive(0.001), 42),
//!     vec![Monitor::temporal_average(1.0), Monitor::global_average(1.0)],
//! );
//! sim.configure()?;
//!
//! let mut samples = 0;
//! for step in sim.run(5.0)? {
//!     samples += step?.samples.iter().flatten().count();
//! }
//! assert_eq!(samples, 10);
//! # Ok::<(), vbrain::neural::SimError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: vbrain-sim-neural                          │
//! │  (StateArray, Connectivity, Coupling, LocalDynamics)    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Storage: vbrain-sim-runtime                            │
//! │  (Runtime trait, delay history ring buffer)             │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: vbrain-sim-engine                          │
//! │  (Noise, integrators, monitors, simulator)              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export foundation
pub use vbrain_sim_neural as neural;
pub use vbrain_sim_runtime as runtime;

// Re-export algorithms
pub use vbrain_sim_engine as engine;

// Re-export infrastructure
#[cfg(feature = "config")]
pub use vbrain_config as config;

pub use vbrain_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::neural::coupling::{
        Difference, HyperbolicTangent, Kuramoto, Linear, PreSigmoidal, Scaling, Sigmoidal,
        SigmoidalJansenRit,
    };
    pub use crate::neural::{
        Connectivity, Coupling, Generic2dOscillator, KuramotoOscillator, LinearModel,
        LocalDynamics, SimError, StateArray, WeightScaling,
    };

    pub use crate::runtime::{Runtime, RuntimeConfig, StdRuntime};

    pub use crate::engine::{
        EegReference, InitialConditions, Integrator, Monitor, MonitorSample, Noise,
        SensorProjection, SimulationOptions, SimulationRun, Simulator, SimulatorState,
        StepOutput,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, SimulationConfig};

    #[cfg(feature = "config")]
    pub use crate::engine::FromConfig;
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let state = StateArray::zeros(2, 3, 1);
        assert_eq!(state.shape(), (2, 3, 1));
        assert_eq!(SimulatorState::Unconfigured.as_str(), "Unconfigured");
    }
}
