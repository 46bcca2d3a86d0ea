// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console logging is always available. With the `file-logging` feature a
//! timestamped run folder receives one JSON log per vbrain crate plus a
//! combined log, and old run folders are pruned by age and count.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

/// Install a global console subscriber
///
/// `RUST_LOG` takes precedence over `level` when set. Fails if a global
/// subscriber is already installed.
pub fn init_console_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid log filter '{}': {}", level, e))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install logging subscriber: {}", e))
}

/// Console logging from a [`LoggingConfig`] and per-crate debug flags
pub fn init_console_logging_with_flags(config: &LoggingConfig, flags: &CrateDebugFlags) -> Result<()> {
    init_console_logging(&flags.to_filter_string(&config.level), config.format)
}

#[cfg(feature = "file-logging")]
pub use file::{init_logging, init_logging_default, LoggingGuard};

#[cfg(feature = "file-logging")]
mod file {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use chrono::{DateTime, NaiveDateTime, Utc};
    use tracing::warn;
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer, Registry};

    use crate::cli::CrateDebugFlags;
    use crate::{crate_target, KNOWN_CRATES};

    const RUN_PREFIX: &str = "run_";
    const RUN_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Keeps the non-blocking writers alive; logs flush on drop
    pub struct LoggingGuard {
        _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
        log_dir: PathBuf,
    }

    impl LoggingGuard {
        /// The run folder receiving this process's logs
        pub fn log_dir(&self) -> &Path {
            &self.log_dir
        }
    }

    /// Initialize console and file logging
    ///
    /// ```text
    /// ./logs/
    ///   run_20250101_120000/
    ///     vbrain-sim-engine.log
    ///     vbrain-config.log
    ///     ...
    ///     vbrain.log (combined)
    /// ```
    ///
    /// # Arguments
    /// * `debug_flags` - Per-crate debug flags for filtering
    /// * `log_dir` - Base directory for logs (default: `./logs`)
    /// * `retention_days` - Keep logs for N days (default: 30)
    /// * `retention_runs` - Keep N most recent runs (default: 10)
    pub fn init_logging(
        debug_flags: &CrateDebugFlags,
        log_dir: Option<PathBuf>,
        retention_days: Option<u64>,
        retention_runs: Option<usize>,
    ) -> Result<LoggingGuard> {
        let base_log_dir = log_dir.unwrap_or_else(|| PathBuf::from("./logs"));
        let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, Utc::now().format(RUN_FORMAT)));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_logs(
            &base_log_dir,
            &run_folder,
            retention_days.unwrap_or(30),
            retention_runs.unwrap_or(10),
        )?;

        let env_filter = EnvFilter::new(debug_flags.to_filter_string("info"));
        let mut layers = Vec::new();
        let mut file_guards = Vec::new();

        layers.push(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_filter(env_filter.clone())
                .boxed(),
        );

        for crate_name in KNOWN_CRATES {
            let appender = rolling::daily(&run_folder, format!("{}.log", crate_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_guards.push(guard);
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_filter(EnvFilter::new(format!("{}=debug,off", crate_target(crate_name))))
                    .boxed(),
            );
        }

        let (combined, combined_guard) =
            tracing_appender::non_blocking(rolling::daily(&run_folder, "vbrain.log"));
        file_guards.push(combined_guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(combined)
                .with_target(true)
                .json()
                .with_filter(env_filter)
                .boxed(),
        );

        Registry::default()
            .with(layers)
            .try_init()
            .context("failed to install logging subscriber")?;

        Ok(LoggingGuard {
            _file_guards: file_guards,
            log_dir: run_folder,
        })
    }

    pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
        init_logging(debug_flags, None, None, None)
    }

    fn run_timestamp(path: &Path) -> Option<DateTime<Utc>> {
        let name = path.file_name()?.to_str()?;
        let stamp = name.strip_prefix(RUN_PREFIX)?;
        NaiveDateTime::parse_from_str(stamp, RUN_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Remove run folders older than `retention_days`, then all but the newest
    /// `retention_runs`. `current` is never removed.
    pub(crate) fn cleanup_old_logs(
        base_log_dir: &Path,
        current: &Path,
        retention_days: u64,
        retention_runs: usize,
    ) -> Result<usize> {
        if !base_log_dir.exists() {
            return Ok(0);
        }
        let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);

        let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if path.is_dir() && path != current {
                if let Some(stamp) = run_timestamp(&path) {
                    runs.push((path, stamp));
                }
            }
        }
        // Newest first
        runs.sort_by(|a, b| b.1.cmp(&a.1));

        // The current run counts toward the limit
        let keep = retention_runs.saturating_sub(1);
        let mut removed = 0;
        for (index, (path, stamp)) in runs.iter().enumerate() {
            if *stamp < cutoff || index >= keep {
                match std::fs::remove_dir_all(path) {
                    Ok(()) => removed += 1,
                    Err(e) => warn!("Failed to remove old log directory {}: {}", path.display(), e),
                }
            }
        }
        Ok(removed)
    }

}
