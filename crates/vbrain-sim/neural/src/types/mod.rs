// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Core Types
//!
//! State arrays, connectivity and the error taxonomy shared by every crate.

pub mod connectome;
pub mod error;
pub mod state;

// Re-export commonly used types
pub use connectome::{Connectivity, CouplingGraph, DelayMatrix, Edge, WeightScaling};
pub use error::{Error, ErrorKind, Result, SimError};
pub use state::StateArray;
