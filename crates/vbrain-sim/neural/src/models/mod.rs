// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Local Dynamics Models
//!
//! Trait-based node model system. The simulator only sees
//! [`LocalDynamics`]; concrete models live in their own files.
//!
//! ## Adding a New Model
//!
//! 1. Create `src/models/your_model.rs`
//! 2. Implement `LocalDynamics` (and `ModelParameters` for its parameters)
//! 3. Add tests
//! 4. Export in `mod.rs`

pub mod generic_2d_oscillator;
pub mod kuramoto;
pub mod linear;
pub mod traits;

// Re-export core types
pub use generic_2d_oscillator::{Generic2dOscillator, Generic2dOscillatorParameters};
pub use kuramoto::{KuramotoOscillator, KuramotoParameters};
pub use linear::{LinearModel, LinearParameters};
pub use traits::{LocalDynamics, ModelParameters};
