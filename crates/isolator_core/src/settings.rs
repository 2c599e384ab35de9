//! Persistent Settings
//!
//! # Storage Locations
//! - Linux: `~/.config/isolator/settings.json`
//! - Windows: `%APPDATA%\isolator\isolator\config\settings.json`
//! - macOS: `~/Library/Application Support/com.isolator.isolator/settings.json`

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::StreamConfig;
use crate::error::{EngineError, EngineResult};
use crate::state::EqState;

/// Root settings structure for the standalone app
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsolatorSettings {
    #[serde(default)]
    pub state: EqState,
    #[serde(default)]
    pub stream: StreamConfig,
    /// Device names; `None` means the system default
    #[serde(default)]
    pub input_device: Option<String>,
    #[serde(default)]
    pub output_device: Option<String>,
}

impl IsolatorSettings {
    /// Load settings from the config directory, or defaults if missing/corrupt
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                info!("No config directory, using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::File::open(path) {
                Ok(file) => match serde_json::from_reader(file) {
                    Ok(settings) => {
                        info!("Settings loaded from {:?}", path);
                        return settings;
                    }
                    Err(e) => error!("Failed to parse settings file: {}", e),
                },
                Err(e) => error!("Failed to open settings file: {}", e),
            }
        }

        info!("Using default settings");
        Self::default()
    }

    pub fn save(&self) -> EngineResult<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| EngineError::SettingsError("Could not determine config path".into()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> EngineResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| EngineError::SettingsError(e.to_string()))?;
        }

        let file = fs::File::create(path).map_err(|e| EngineError::SettingsError(e.to_string()))?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| EngineError::SettingsError(e.to_string()))?;

        info!("Settings saved to {:?}", path);
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "isolator", "isolator")
            .map(|proj| proj.config_dir().join("settings.json"))
    }
}
