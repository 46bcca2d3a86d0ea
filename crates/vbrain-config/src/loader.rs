// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, SimulationConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "vbrain_simulation.toml";

/// Find the simulation configuration file
///
/// Search order:
/// 1. `VBRAIN_CONFIG_PATH` environment variable
/// 2. Current working directory: `./vbrain_simulation.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("VBRAIN_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by VBRAIN_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet VBRAIN_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Call [`crate::validate_config`] on the result before building a simulator.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SimulationConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SimulationConfig = toml::from_str(&content)?;

    // Apply overrides in order
    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `VBRAIN_DT` -> `simulation.dt`
/// - `VBRAIN_SIMULATION_LENGTH` -> `simulation.simulation_length`
/// - `VBRAIN_SEED` -> `simulation.seed`
/// - `VBRAIN_CONDUCTION_SPEED` -> `connectivity.speed`
/// - `VBRAIN_NUM_THREADS` -> `runtime.num_threads`
/// - `VBRAIN_LOG_LEVEL` -> `logging.level`
///
/// Unparseable values are ignored.
pub fn apply_environment_overrides(config: &mut SimulationConfig) {
    let lookup: HashMap<String, String> = [
        ("dt", "VBRAIN_DT"),
        ("simulation_length", "VBRAIN_SIMULATION_LENGTH"),
        ("seed", "VBRAIN_SEED"),
        ("conduction_speed", "VBRAIN_CONDUCTION_SPEED"),
        ("num_threads", "VBRAIN_NUM_THREADS"),
        ("log_level", "VBRAIN_LOG_LEVEL"),
    ]
    .iter()
    .filter_map(|(key, var)| env::var(var).ok().map(|v| (key.to_string(), v)))
    .collect();

    apply_cli_overrides(config, &lookup);
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"dt": "0.05", "seed": "7"}`)
pub fn apply_cli_overrides(config: &mut SimulationConfig, cli_args: &HashMap<String, String>) {
    // Simulation settings
    if let Some(value) = cli_args.get("dt") {
        if let Ok(dt) = value.parse::<f64>() {
            config.simulation.dt = dt;
        }
    }
    if let Some(value) = cli_args.get("simulation_length") {
        if let Ok(length) = value.parse::<f64>() {
            config.simulation.simulation_length = length;
        }
    }
    if let Some(value) = cli_args.get("seed") {
        if let Ok(seed) = value.parse::<u64>() {
            config.simulation.seed = seed;
        }
    }

    // Connectivity
    if let Some(value) = cli_args.get("conduction_speed") {
        if let Ok(speed) = value.parse::<f64>() {
            config.connectivity.speed = speed;
        }
    }

    // Runtime
    if let Some(value) = cli_args.get("num_threads") {
        if let Ok(threads) = value.parse::<usize>() {
            config.runtime.num_threads = threads;
        }
    }

    // Logging
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
