//! Domain error types

use thiserror::Error;

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),

    #[error("Could not determine the config directory")]
    NoConfigDir,
}

/// Error when persisting a preference.
///
/// Reads never produce this error: a missing or broken preference file
/// falls back to defaults.
#[derive(Debug, Clone, Error)]
pub enum PreferenceError {
    #[error("Failed to serialize preferences: {0}")]
    Serialize(String),

    #[error("Failed to write preference file {path}: {message}")]
    Write { path: String, message: String },
}

/// Error when an input device selector cannot be resolved
#[derive(Debug, Clone, Error)]
#[error("Unknown input device: \"{input}\". Run 'audiorec devices' to list available devices")]
pub struct UnknownDeviceError {
    pub input: String,
}
