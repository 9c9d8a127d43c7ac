use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::calculator::{
    InstrumentConfig, MeasurementParameters, DEFAULT_CARRIER_GAS_MOLAR_RATE,
    DEFAULT_H_STD_CONTENT,
};

pub const DEFAULT_SETTINGS_FILE: &str = "HydroTraceSettings.yml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("{field} must be a finite, positive number (got {value})")]
    InvalidValue { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowSettings {
    /// Hydrogen standard content, ppm.
    pub content: f64,
    /// Carrier gas molar rate, µmol/s.
    pub molar_rate: f64,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            content: DEFAULT_H_STD_CONTENT,
            molar_rate: DEFAULT_CARRIER_GAS_MOLAR_RATE,
        }
    }
}

impl FlowSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (field, value) in [("content", self.content), ("molar_rate", self.molar_rate)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::InvalidValue { field, value });
            }
        }
        Ok(())
    }
}

/// Persisted settings document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "FlowSettings")]
    pub flow: FlowSettings,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_yaml::from_str(&content).map_err(|source| SettingsError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;
        settings.flow.validate()?;
        Ok(settings)
    }

    /// Rewrites the whole document.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        self.flow.validate()?;
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the document, writing defaults first if it does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            let settings = Self::load(path)?;
            info!(path = %path.display(), "loaded settings");
            return Ok(settings);
        }

        warn!(path = %path.display(), "settings file not found, writing defaults");
        let settings = Settings::default();
        settings.save(path)?;
        Ok(settings)
    }

    pub fn instrument(&self, measurement: MeasurementParameters) -> InstrumentConfig {
        InstrumentConfig::new(self.flow.content, self.flow.molar_rate, measurement)
    }
}
