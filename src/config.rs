//! Per-run settings and logging configuration.

use std::path::Path;

use anyhow::Context as _;

use crate::error::{FramerError, FramerResult};

pub const DEFAULT_PREFIX: &str = "framed_";
pub const DEFAULT_QUALITY: f32 = 0.9;
pub const DEFAULT_MAX_DIMENSION: u32 = 2500;

/// Settings fixed for the duration of one batch run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Prepended to every output file name and to the archive name.
    pub prefix: String,
    /// JPEG quality as a fraction in `[0, 1]`.
    pub quality: f32,
    /// Photos larger than this on either side are scaled down to fit.
    pub max_dimension: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            quality: DEFAULT_QUALITY,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> FramerResult<()> {
        if !self.quality.is_finite() || !(0.0..=1.0).contains(&self.quality) {
            return Err(FramerError::validation(format!(
                "quality must be within [0, 1], got {}",
                self.quality
            )));
        }
        if self.max_dimension == 0 {
            return Err(FramerError::validation("max_dimension must be > 0"));
        }
        if self.prefix.contains(['/', '\\']) {
            return Err(FramerError::validation(format!(
                "prefix '{}' must not contain path separators",
                self.prefix
            )));
        }
        Ok(())
    }

    /// JPEG encoder quality (1..=100) for the configured fraction.
    pub fn jpeg_quality(&self) -> u8 {
        ((self.quality.clamp(0.0, 1.0) * 100.0).round() as u8).clamp(1, 100)
    }

    pub fn from_json_file(path: &Path) -> FramerResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw)
            .map_err(|e| FramerError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "batchframe=debug,warn".
    pub level: String,
    /// Emit structured JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
