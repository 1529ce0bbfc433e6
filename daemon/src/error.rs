use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Config file parsing error: {0}")]
    ConfigFileParsingError(#[from] toml::de::Error),
    #[error("Failed to open input device {}: {1}", .0.display())]
    InputDeviceOpenError(PathBuf, std::io::Error),
    #[error("Failed to start tokio runtime: {0}")]
    RuntimeError(std::io::Error),
}
