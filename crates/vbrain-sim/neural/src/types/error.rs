// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for simulation operations
//!
//! Three classes of failure exist, and every variant belongs to exactly one:
//! - **Configuration**: raised by `configure()` before any stepping begins
//! - **ParameterDomain**: a component parameter is outside its valid domain
//! - **NumericalInstability**: a non-finite value was found in the state

/// Coarse classification of a [`SimError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    ParameterDomain,
    NumericalInstability,
}

/// Error types for simulation operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("History buffer needs {requested_bytes} bytes, limit is {limit_bytes} bytes")]
    HistoryTooLarge {
        requested_bytes: usize,
        limit_bytes: usize,
    },

    #[error("Monitor '{monitor}' period {period} is not a positive integer multiple of dt={dt}")]
    InvalidMonitorPeriod {
        monitor: String,
        period: f64,
        dt: f64,
    },

    #[error("Simulator is {actual}, operation requires {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Parameter {component}.{parameter} out of domain: {reason}")]
    ParameterDomain {
        component: &'static str,
        parameter: &'static str,
        reason: String,
    },

    #[error(
        "Non-finite state at step {step}: variable {variable}, node {node}, mode {mode}"
    )]
    NumericalInstability {
        step: u64,
        variable: usize,
        node: usize,
        mode: usize,
    },
}

impl SimError {
    /// Shorthand for a [`SimError::ParameterDomain`] error
    pub fn domain(
        component: &'static str,
        parameter: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        SimError::ParameterDomain {
            component,
            parameter,
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`SimError::DimensionMismatch`] error
    pub fn mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        SimError::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SimError::Configuration(_)
            | SimError::DimensionMismatch { .. }
            | SimError::HistoryTooLarge { .. }
            | SimError::InvalidMonitorPeriod { .. }
            | SimError::InvalidState { .. } => ErrorKind::Configuration,
            SimError::ParameterDomain { .. } => ErrorKind::ParameterDomain,
            SimError::NumericalInstability { .. } => ErrorKind::NumericalInstability,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

pub type Result<T> = core::result::Result<T, SimError>;
pub type Error = SimError;
