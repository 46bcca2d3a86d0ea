// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # vbrain Configuration System
//!
//! Type-safe configuration loader for network simulations with support for:
//! - TOML file parsing
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vbrain_config::{load_config, SimulationConfig};
//!
//! // Load configuration with automatic file discovery and overrides
//! let config = load_config(None, None).expect("Failed to load config");
//!
//! println!("dt: {}", config.simulation.dt);
//! println!("length: {}", config.simulation.simulation_length);
//! ```
//!
//! Precedence, highest first: CLI arguments, environment variables, the
//! TOML file, built-in defaults.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(feature = "std")]
pub mod loader;

pub mod types;
pub mod validation;

#[cfg(feature = "std")]
pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    CONFIG_FILE_NAME,
};

pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Re-export for convenience
pub use serde;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[cfg(feature = "std")]
impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.simulation.dt, 0.0625);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.connectivity.speed, 4.0);
        assert_eq!(config.coupling, CouplingConfig::Linear { a: None, b: None });
        assert_eq!(config.integrator.scheme, IntegratorScheme::Heun);
        assert!(config.monitors.is_empty());
        assert_eq!(config.runtime.parallel_threshold, 256);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_json_round_trip_of_tagged_coupling() {
        let coupling = CouplingConfig::Difference { a: Some(0.014) };
        let json = serde_json::to_string(&coupling).unwrap();
        assert!(json.contains("\"kind\":\"difference\""));
        let back: CouplingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coupling);
    }
}
