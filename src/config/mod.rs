//! Configuration file handling.
//!
//! Settings live in a YAML file under the platform config directory
//! (`$XDG_CONFIG_HOME/scriba/config.yaml` on Linux). Missing keys fall back
//! to built-in defaults; the file is created on first load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "qwen/qwen3-30b-a3b:free";

/// Generation temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f64 = 0.8;

const CONFIG_DIR: &str = "scriba";
const CONFIG_FILENAME: &str = "config.yaml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

/// Persisted configuration: model, API token, temperature.
#[derive(Debug)]
pub struct Config {
    path: PathBuf,
    values: ConfigValues,
}

impl Config {
    /// Load from the platform config directory, creating the file if absent.
    pub fn load() -> Result<Self, ConfigError> {
        let dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(CONFIG_DIR);
        Self::load_from(dir.join(CONFIG_FILENAME))
    }

    /// Load from an explicit path. Used directly by tests.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
            }
            let config = Self {
                path,
                values: ConfigValues::default(),
            };
            config.save()?;
            return Ok(config);
        }

        let text = fs::read_to_string(&path).map_err(ConfigError::ReadFailed)?;
        // An empty file deserializes to null, which means "all defaults".
        let values = serde_yaml::from_str::<Option<ConfigValues>>(&text)
            .map_err(ConfigError::ParseFailed)?
            .unwrap_or_default();

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn model(&self) -> &str {
        self.values.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn api_token(&self) -> Option<&str> {
        self.values.api_token.as_deref()
    }

    pub fn temperature(&self) -> f64 {
        self.values.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Set a parameter by name and persist the file.
    pub fn set_parameter(&mut self, parameter: &str, value: &str) -> Result<(), ConfigError> {
        match parameter {
            "model" => self.values.model = Some(value.to_string()),
            "api_token" => self.values.api_token = Some(value.to_string()),
            "temperature" => {
                let temperature: f64 =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        parameter: "temperature".to_string(),
                        message: format!("'{value}' is not a number"),
                    })?;
                self.values.temperature = Some(temperature);
            }
            other => return Err(ConfigError::UnknownParameter(other.to_string())),
        }
        self.save()
    }

    /// Get a parameter's configured value by name (None if unset).
    pub fn get_parameter(&self, parameter: &str) -> Result<Option<String>, ConfigError> {
        match parameter {
            "model" => Ok(self.values.model.clone()),
            "api_token" => Ok(self.values.api_token.clone()),
            "temperature" => Ok(self.values.temperature.map(|t| t.to_string())),
            other => Err(ConfigError::UnknownParameter(other.to_string())),
        }
    }

    fn save(&self) -> Result<(), ConfigError> {
        let text = serde_yaml::to_string(&self.values).map_err(ConfigError::ParseFailed)?;
        fs::write(&self.path, text).map_err(ConfigError::WriteFailed)
    }
}
