// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! # vbrain Simulation Engine
//!
//! Delay-coupled network integration: one explicit [`Simulator`] owns a local
//! dynamics model, a connectivity, a coupling function, an integrator and a
//! set of monitors, and emits monitor samples lazily, one step at a time.
//!
//! ## Architecture
//! - History ring buffer sized once at configure time (`vbrain-sim-runtime`)
//! - Sparse per-target coupling with per-edge delays (`vbrain-sim-neural`)
//! - Rayon across target nodes, state points and monitors for large networks,
//!   with results identical to sequential execution
//! - Seeded ChaCha8 noise, reproducible regardless of thread count
//!
//! ## Usage
//!
//! ```rust
//! use vbrain_sim_engine::{Integrator, Monitor, Simulator};
//! use vbrain_sim_neural::coupling::Difference;
//! use vbrain_sim_neural::{Connectivity, Coupling, Generic2dOscillator};
//!
//! let connectivity = Connectivity::uniform(4, 1.0, 10.0, 4.0).unwrap();
//! let mut sim = Simulator::new(
//!     Box::new(Generic2dOscillator::default()),
//!     connectivity,
//!     Coupling::Difference(Difference { a: 0.014 }),
//!     Integrator::heun(0.0625),
//!     vec![Monitor::temporal_average(1.0)],
//! );
//! sim.configure().unwrap();
//! let samples = sim.run_to_end(10.0).unwrap();
//! assert_eq!(samples[0].len(), 10);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod integrators;
pub mod monitors;
pub mod noise;
pub mod run;
pub mod simulator;

#[cfg(feature = "config")]
pub mod config_bridge;

pub use integrators::Integrator;
pub use monitors::{
    EegReference, Monitor, MonitorKind, MonitorSample, RegionMapping, SensorProjection,
};
pub use noise::{Noise, NoiseGenerator};
pub use run::SimulationRun;
pub use simulator::{InitialConditions, SimulationOptions, Simulator, SimulatorState, StepOutput};

#[cfg(feature = "config")]
pub use config_bridge::FromConfig;

/// Simulation performance statistics
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimulationStats {
    pub total_steps: u64,
    /// Monitor samples emitted (all monitors)
    pub total_samples: u64,
    pub total_processing_time_us: u64,
    pub max_step_time_us: u64,
    /// Steps slower than 50 ms
    pub slow_steps: u64,
}

impl SimulationStats {
    /// Get average processing time per step (microseconds)
    pub fn avg_step_time_us(&self) -> f64 {
        if self.total_steps == 0 {
            0.0
        } else {
            self.total_processing_time_us as f64 / self.total_steps as f64
        }
    }

    /// Get average samples emitted per step
    pub fn avg_samples_per_step(&self) -> f64 {
        if self.total_steps == 0 {
            0.0
        } else {
            self.total_samples as f64 / self.total_steps as f64
        }
    }
}
