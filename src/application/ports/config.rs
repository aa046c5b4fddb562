//! Configuration port interface

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for the TOML application config (device, timeslice, bitrate, picker)
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the config file as written, without range checks.
    ///
    /// A missing file yields an empty config, not an error.
    async fn read(&self) -> Result<AppConfig, ConfigError>;

    /// Read the config file and reject out-of-range values
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        let config = self.read().await?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config file, creating its directory when needed
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Location of the config file
    fn path(&self) -> PathBuf;

    /// Whether the config file exists
    fn exists(&self) -> bool;

    /// Write a config file filled with defaults.
    /// Fails if the file already exists.
    async fn init(&self) -> Result<(), ConfigError>;
}
