use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("{field}: '{text}' is not a number")]
    InvalidNumber { field: &'static str, text: String },
    #[error("Coordinate frame '{0}' must hold 6 numbers")]
    InvalidTransform(String),
    #[error("Failed to access settings file {path}: {source}")]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Settings file {path} is malformed: {source}")]
    SettingsFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}
