// src/config.rs - TOML configuration for FieldVisionR

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::DEFAULT_SAMPLE_STRIDE;
use crate::classify::ClassifierThresholds;
use crate::errors::{FieldVisionError, Result};
use crate::zones::{DEFAULT_COARSE_GRID_SIZE, DEFAULT_FINE_GRID_SIZE};

/// Which of the two historical metric pipelines to run. They use slightly
/// different formulas (pseudo-vigor/health-ratio vs. normalized
/// vigor/health-index) and are deliberately kept separate.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricsStrategy {
    /// Full-resolution scan, fine 3x3 grid, health ratio
    Fine,
    /// Sampled scan, coarse 8x8 grid, composite health index
    Coarse,
}

impl MetricsStrategy {
    pub fn default_grid_size(self) -> u32 {
        match self {
            MetricsStrategy::Fine => DEFAULT_FINE_GRID_SIZE,
            MetricsStrategy::Coarse => DEFAULT_COARSE_GRID_SIZE,
        }
    }
}

/// Configuration for FieldVisionR
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub input_path: String,
    pub output_base_dir: String,

    #[serde(default = "default_strategy")]
    pub strategy: MetricsStrategy,

    /// Grid size override; when absent the strategy default applies
    #[serde(default)]
    pub grid_size: Option<u32>,

    #[serde(default = "default_include_zones")]
    pub include_zones: bool,

    #[serde(default = "default_sample_stride")]
    pub sample_stride: u32,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    #[serde(default)]
    pub thresholds: ClassifierThresholds,
}

fn default_strategy() -> MetricsStrategy {
    MetricsStrategy::Fine
}

fn default_include_zones() -> bool {
    true
}

fn default_sample_stride() -> u32 {
    DEFAULT_SAMPLE_STRIDE
}

fn default_parallel() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            output_base_dir: "./output".to_string(),
            strategy: MetricsStrategy::Fine,
            grid_size: None,
            include_zones: true,
            sample_stride: DEFAULT_SAMPLE_STRIDE,
            use_parallel: true,
            thresholds: ClassifierThresholds::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            FieldVisionError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            FieldVisionError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(config)
    }

    /// Effective grid size for the configured strategy
    pub fn effective_grid_size(&self) -> u32 {
        self.grid_size.unwrap_or(self.strategy.default_grid_size())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(FieldVisionError::InvalidPath(input_path));
        }

        if let Some(grid_size) = self.grid_size {
            if grid_size == 0 {
                return Err(FieldVisionError::Config(
                    "grid_size must be >= 1".to_string(),
                ));
            }
        }

        if self.sample_stride == 0 {
            return Err(FieldVisionError::Config(
                "sample_stride must be >= 1".to_string(),
            ));
        }

        if self.thresholds.vegetation_green_min == 0 {
            return Err(FieldVisionError::Config(
                "vegetation_green_min must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FieldVisionError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;

        Ok(())
    }
}
