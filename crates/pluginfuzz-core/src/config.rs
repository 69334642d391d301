//! Fuzz run configuration
//!
//! [`FuzzConfig`] is the on-disk JSON form; missing fields fall back to
//! defaults. [`FuzzOptions`] is the validated subset the session runner
//! consumes.

use crate::fuzz::strictness::StrictnessPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_sample_rates() -> Vec<f64> {
    vec![44100.0, 48000.0, 96000.0]
}

fn default_block_size() -> usize {
    crate::DEFAULT_BLOCK_SIZE
}

fn default_strictness_level() -> i32 {
    crate::fuzz::strictness::SUBNORMAL_ERROR_LEVEL
}

fn default_session_seconds() -> f64 {
    crate::SESSION_SECONDS
}

fn default_channels() -> usize {
    2
}

/// Persistent fuzz configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzConfig {
    /// Sample rates to run one session each at, in order
    #[serde(default = "default_sample_rates")]
    pub sample_rates: Vec<f64>,
    /// Nominal block size processors are prepared with
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// Strictness level; above 5 subnormals are failures
    #[serde(default = "default_strictness_level")]
    pub strictness_level: i32,
    /// Random seed (None = draw a fresh one)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Simulated seconds per session
    #[serde(default = "default_session_seconds")]
    pub session_seconds: f64,
    /// Channel count for reference processors
    #[serde(default = "default_channels")]
    pub channels: usize,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            sample_rates: default_sample_rates(),
            block_size: default_block_size(),
            strictness_level: default_strictness_level(),
            seed: None,
            session_seconds: default_session_seconds(),
            channels: default_channels(),
        }
    }
}

impl FuzzConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = serde_json::from_str(&contents)?;
        tracing::info!(path = %path.display(), "Loaded config from disk");
        Ok(config)
    }

    /// Save config as pretty JSON, creating parent directories if needed
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(write_err)?;
        tracing::info!(path = %path.display(), "Config saved to disk");
        Ok(())
    }

    /// Options for [`SessionRunner`](crate::fuzz::session::SessionRunner)
    pub fn to_options(&self) -> FuzzOptions {
        FuzzOptions {
            sample_rates: self.sample_rates.clone(),
            block_size: self.block_size,
            strictness: StrictnessPolicy::from_level(self.strictness_level),
            session_seconds: self.session_seconds,
        }
    }
}

/// What a session runner needs to know about a run
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzOptions {
    /// One session per entry, in order; must not be empty
    pub sample_rates: Vec<f64>,
    /// Nominal block size; sub-blocks are drawn from `[0, block_size]`
    pub block_size: usize,
    /// Whether subnormals fail or warn
    pub strictness: StrictnessPolicy,
    /// Simulated seconds per session
    pub session_seconds: f64,
}

impl Default for FuzzOptions {
    fn default() -> Self {
        FuzzConfig::default().to_options()
    }
}

impl FuzzOptions {
    pub fn with_sample_rates(mut self, sample_rates: Vec<f64>) -> Self {
        self.sample_rates = sample_rates;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_strictness_level(mut self, level: i32) -> Self {
        self.strictness = StrictnessPolicy::from_level(level);
        self
    }

    pub fn with_session_seconds(mut self, seconds: f64) -> Self {
        self.session_seconds = seconds;
        self
    }
}
