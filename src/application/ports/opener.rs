//! Folder opener port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Opener errors
#[derive(Debug, Clone, Error)]
pub enum OpenError {
    #[error("{0} not found")]
    ToolNotFound(String),

    #[error("Failed to open {path}: {message}")]
    Failed { path: String, message: String },
}

/// Port for showing a directory in the desktop file manager
#[async_trait]
pub trait FolderOpener: Send + Sync {
    async fn open(&self, path: &Path) -> Result<(), OpenError>;
}
