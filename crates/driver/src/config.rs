use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors from loading or validating a [`DriverConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension: {0:?}")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Runtime configuration for the frame driver.
///
/// Missing fields fall back to [`Default`], so a config file only needs the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Seconds per fixed update step.
    pub fixed_timestep: f64,
    /// Upper bound on fixed passes run in one frame.
    pub max_fixed_steps_per_frame: u32,
    /// Maximum update steps pulled per frame; `None` drains every pass.
    pub update_step_budget: Option<usize>,
    pub time_scale: f64,
    /// Number of frame times kept for averages.
    pub frame_history: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_fixed_steps_per_frame: 5,
            update_step_budget: None,
            time_scale: 1.0,
            frame_history: 120,
        }
    }
}

impl DriverConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let text = std::fs::read_to_string(path)?;
        let config = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(extension)),
        };
        tracing::debug!(path = %path.display(), ?config, "driver config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fixed_timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if !(self.time_scale.is_finite() && self.time_scale >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "time_scale must be non-negative, got {}",
                self.time_scale
            )));
        }
        if self.frame_history == 0 {
            return Err(ConfigError::Invalid("frame_history must be at least 1".into()));
        }
        Ok(())
    }
}
