use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PanelError;
use crate::jog::JogTexts;
use crate::mru::MruList;

pub const DEFAULT_ENDPOINT: &str = "localhost";

/// Everything the panel remembers between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    pub endpoints: MruList,
    pub csys: MruList,
    pub jog: JogTexts,
    pub tool_frame: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        let mut endpoints = MruList::default();
        endpoints.push(DEFAULT_ENDPOINT);
        Self {
            endpoints,
            csys: MruList::default(),
            jog: JogTexts::default(),
            tool_frame: false,
        }
    }
}

impl PanelSettings {
    /// `<config_dir>/urxui/settings.json`
    pub fn default_path() -> Result<PathBuf, PanelError> {
        let mut path = dirs::config_dir().ok_or(PanelError::NoConfigDir)?;
        path.push("urxui");
        path.push("settings.json");
        Ok(path)
    }

    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, PanelError> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| PanelError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| PanelError::SettingsFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`PanelSettings::load`], but any failure is logged and replaced by
    /// the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("{}; falling back to defaults", e);
            Self::default()
        })
    }

    /// Writes the settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), PanelError> {
        let io_err = |source| PanelError::SettingsIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| PanelError::SettingsFormat {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content).map_err(io_err)
    }
}
