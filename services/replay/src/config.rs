//! Configuration for the replay producer.
//!
//! Loaded from a TOML file with environment variable overrides, the same
//! precedence everywhere: file < environment < command line. Every section
//! has full defaults so a missing file still yields a runnable service.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;

use message_sink::KafkaSinkConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Which interleaving strategy the scheduler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReplayMode {
    /// One value from each sensor in turn, as fast as the sink accepts them.
    RoundRobin,
    /// Full historical replay: every value of every sensor, with a fixed
    /// delay between records.
    Sequential,
}

impl fmt::Display for ReplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayMode::RoundRobin => write!(f, "round-robin"),
            ReplayMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySection {
    pub mode: ReplayMode,
    /// Directory of measurement files, one file per sensor.
    pub measurements_dir: PathBuf,
    /// Inter-record delay for sequential mode, in milliseconds.
    pub interval_ms: u64,
}

impl Default for ReplaySection {
    fn default() -> Self {
        Self {
            mode: ReplayMode::RoundRobin,
            measurements_dir: PathBuf::from("measurements"),
            interval_ms: 150,
        }
    }
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownSection {
    /// Bound on the flush of buffered messages during shutdown.
    pub drain_timeout_secs: u64,
}

impl Default for ShutdownSection {
    fn default() -> Self {
        Self {
            drain_timeout_secs: 10,
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub replay: ReplaySection,
    pub kafka: KafkaSinkConfig,
    pub shutdown: ShutdownSection,
}

impl ReplayConfig {
    /// Load from a TOML file; a missing file falls back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(
                "config file {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Apply environment variable overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(servers) = std::env::var("HEARTH_KAFKA_BOOTSTRAP_SERVERS") {
            self.kafka.bootstrap_servers = servers;
        }
        if let Ok(topic) = std::env::var("HEARTH_KAFKA_TOPIC") {
            self.kafka.topic = topic;
        }
        if let Ok(dir) = std::env::var("HEARTH_MEASUREMENTS_DIR") {
            self.replay.measurements_dir = PathBuf::from(dir);
        }
    }
}
