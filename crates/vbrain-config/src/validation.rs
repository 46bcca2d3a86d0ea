// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! consistent and within valid ranges. Every problem is collected before
//! reporting so one run surfaces all of them.

use crate::{ConfigError, ConfigResult, CouplingConfig, MonitorKind, SimulationConfig};

/// Relative tolerance when checking that a monitor period is a multiple of dt
const PERIOD_TOLERANCE: f64 = 1e-6;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    NotPositive { field: String, value: f64 },
    InvalidPeriod { field: String, period: f64, dt: f64 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPositive { field, value } => {
                write!(f, "{} = {} must be positive and finite", field, value)
            }
            Self::InvalidPeriod { field, period, dt } => {
                write!(
                    f,
                    "{} = {} is not a positive integer multiple of dt = {}",
                    field, period, dt
                )
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Positive time step, simulation length and conduction speed
/// - Monitor periods that are positive multiples of dt
/// - Non-negative noise intensities
/// - Coupling parameter domains that can be checked without a model
/// - Known logging level and format
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &SimulationConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// All validation problems, in section order
pub fn collect_errors(config: &SimulationConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_simulation(config, &mut errors);
    validate_monitors(config, &mut errors);
    validate_noise(config, &mut errors);
    validate_coupling(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn positive(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(ConfigValidationError::NotPositive {
            field: field.to_string(),
            value,
        });
    }
}

fn validate_simulation(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    positive("simulation.dt", config.simulation.dt, errors);
    positive(
        "simulation.simulation_length",
        config.simulation.simulation_length,
        errors,
    );
    positive("connectivity.speed", config.connectivity.speed, errors);
    if !config.simulation.local_coupling_strength.is_finite() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "simulation.local_coupling_strength".to_string(),
            reason: "must be finite".to_string(),
        });
    }
    if config.runtime.history_memory_limit_mb == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "runtime.history_memory_limit_mb".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_monitors(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    let dt = config.simulation.dt;
    if !(dt.is_finite() && dt > 0.0) {
        // Already reported; periods cannot be checked against it
        return;
    }
    for (idx, monitor) in config.monitors.iter().enumerate() {
        if monitor.kind == MonitorKind::Raw {
            continue;
        }
        let period = monitor.period;
        let ratio = period / dt;
        let istep = ratio.round();
        let exact = (istep * dt - period).abs() <= PERIOD_TOLERANCE * period.abs();
        if !(period.is_finite() && period > 0.0 && istep >= 1.0 && exact) {
            errors.push(ConfigValidationError::InvalidPeriod {
                field: format!("monitors[{}].period", idx),
                period,
                dt,
            });
        }
    }
}

fn validate_noise(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    if !config.integrator.scheme.is_stochastic() {
        return;
    }
    let noise = &config.integrator.noise;
    if noise.nsig.is_empty() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "integrator.noise.nsig".to_string(),
            reason: "must contain at least one value".to_string(),
        });
    }
    for (idx, nsig) in noise.nsig.iter().enumerate() {
        if !(nsig.is_finite() && *nsig >= 0.0) {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("integrator.noise.nsig[{}]", idx),
                reason: format!("must be finite and non-negative, got {}", nsig),
            });
        }
    }
}

fn validate_coupling(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    let (sigma, range) = match &config.coupling {
        CouplingConfig::Sigmoidal {
            sigma, cmin, cmax, ..
        } => (*sigma, Some((*cmin, *cmax))),
        CouplingConfig::HyperbolicTangent { sigma, .. } => (*sigma, None),
        CouplingConfig::SigmoidalJansenRit { cmin, cmax, .. } => (None, Some((*cmin, *cmax))),
        _ => (None, None),
    };
    if sigma == Some(0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "coupling.sigma".to_string(),
            reason: "must be non-zero".to_string(),
        });
    }
    if let Some((Some(cmin), Some(cmax))) = range {
        if cmax <= cmin {
            errors.push(ConfigValidationError::InvalidValue {
                field: "coupling.cmax".to_string(),
                reason: format!("must exceed cmin ({} <= {})", cmax, cmin),
            });
        }
    }
}

fn validate_logging(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
    if config.logging.format != "text" && config.logging.format != "json" {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: "must be 'text' or 'json'".to_string(),
        });
    }
}
