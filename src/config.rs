//! `clickreplay.toml` config loading.

use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::{CoordinateMode, DEFAULT_SAMPLE_RATE, EventLog, ReplayError, ReplayResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Sample rate recorded into newly created logs.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f32,

    /// Coordinate mode of newly created logs.
    #[serde(default = "default_mode")]
    pub mode: CoordinateMode,

    /// File extension picked up when a directory is inspected.
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_sample_rate() -> f32 {
    DEFAULT_SAMPLE_RATE
}

fn default_mode() -> CoordinateMode {
    CoordinateMode::TimestampOnly
}

fn default_extension() -> String {
    "replay".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            mode: default_mode(),
            extension: default_extension(),
        }
    }
}

impl Config {
    pub fn load_optional(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => match Self::parse(&s) {
                Ok(cfg) => cfg,
                Err(err) => {
                    tracing::warn!("failed to parse config {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                tracing::warn!("failed to read config {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(s: &str) -> ReplayResult<Self> {
        let cfg: Config = toml::from_str(s)?;
        if !(cfg.sample_rate.is_finite() && cfg.sample_rate > 0.0) {
            return Err(ReplayError::Config(format!(
                "sample_rate must be a positive number, got {}",
                cfg.sample_rate
            )));
        }
        Ok(cfg)
    }

    pub fn new_log(&self) -> EventLog {
        EventLog::new(self.sample_rate, self.mode)
    }
}
