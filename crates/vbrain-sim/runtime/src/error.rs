// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for runtime operations

use vbrain_sim_neural::SimError;

/// Runtime errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// Capacity exceeded
    #[error("Capacity exceeded: requested {requested}, available {available}")]
    CapacityExceeded {
        /// Requested capacity
        requested: usize,
        /// Available capacity
        available: usize,
    },

    /// Allocation would exceed the runtime memory limit
    #[error("Out of memory: requested {requested_bytes} bytes, limit {limit_bytes} bytes")]
    OutOfMemory {
        /// Requested bytes (`usize::MAX` when the size computation overflowed)
        requested_bytes: usize,
        /// Limit in force
        limit_bytes: usize,
    },

    /// Invalid parameters provided
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<RuntimeError> for SimError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::OutOfMemory {
                requested_bytes,
                limit_bytes,
            } => SimError::HistoryTooLarge {
                requested_bytes,
                limit_bytes,
            },
            other => SimError::Configuration(other.to_string()),
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = core::result::Result<T, RuntimeError>;
