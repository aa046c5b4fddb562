//! Directory picker port interface

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Picker errors
#[derive(Debug, Clone, Error)]
pub enum PickerError {
    #[error("{0} not found. Please install it or set 'picker' in the config")]
    ToolNotFound(String),

    #[error("Picker failed: {0}")]
    Failed(String),
}

/// Port for the native directory chooser
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// Ask the user for a directory.
    ///
    /// # Returns
    /// `Ok(None)` when the user cancelled the dialog
    async fn pick_directory(&self) -> Result<Option<PathBuf>, PickerError>;
}

/// Blanket implementation for boxed picker types
#[async_trait]
impl DirectoryPicker for Box<dyn DirectoryPicker> {
    async fn pick_directory(&self) -> Result<Option<PathBuf>, PickerError> {
        self.as_ref().pick_directory().await
    }
}
