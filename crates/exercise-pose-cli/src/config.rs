//! Configuration management for the Exercise Pose CLI

use anyhow::{Context, Result};
use exercise_pose_core::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "exercise-pose.toml";

/// Exercise Pose CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Analysis options passed to the core
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Output options
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Use colors in output
    #[serde(default = "default_true")]
    pub colors: bool,

    /// Maximum number of issues listed per severity in table output
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_issues() -> usize {
    50
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            colors: true,
            max_issues: default_max_issues(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration with precedence: env vars > config file > defaults.
    ///
    /// An explicit `config_path` must exist; the default location is only
    /// used when present.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(&fallback)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_vars()?;
        config
            .analysis
            .validate()
            .context("Invalid analysis configuration")?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_vars(&mut self) -> Result<()> {
        if let Ok(threshold) = std::env::var("EXERCISE_POSE_MIN_CONFIDENCE") {
            self.analysis.min_confidence_threshold = threshold
                .parse()
                .context("Invalid EXERCISE_POSE_MIN_CONFIDENCE")?;
        }

        if let Ok(count) = std::env::var("EXERCISE_POSE_MIN_KEYPOINTS") {
            self.analysis.min_keypoint_count =
                count.parse().context("Invalid EXERCISE_POSE_MIN_KEYPOINTS")?;
        }

        if std::env::var_os("NO_COLOR").is_some() {
            self.output.colors = false;
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?).context("Failed to write config file")?;
        Ok(())
    }
}
