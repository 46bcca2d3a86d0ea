// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # vbrain Network Types (Platform-Agnostic)
//!
//! Everything a network simulation computes *with*, independent of how it is
//! stepped or stored:
//! - **Types**: state arrays, connectivity, the error taxonomy
//! - **Coupling**: long-range coupling functions over delayed states
//! - **Models**: local node dynamics (`LocalDynamics` trait + models)
//!
//! History storage lives in `vbrain-sim-runtime`; integration, noise,
//! monitors and the simulator live in `vbrain-sim-engine`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod coupling;
pub mod models;
pub mod types;

// Re-export types
pub use types::{
    Connectivity, CouplingGraph, DelayMatrix, Edge, Error, ErrorKind, Result, SimError,
    StateArray, WeightScaling,
};

pub use coupling::{Coupling, DelayedStates, DenseDelayed};

// Re-export models
pub use models::{
    Generic2dOscillator, Generic2dOscillatorParameters, KuramotoOscillator, KuramotoParameters,
    LinearModel, LinearParameters, LocalDynamics, ModelParameters,
};
