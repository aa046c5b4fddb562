//! Host boundary port interface
//!
//! Operations the front-end asks of the host process.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::error::PreferenceError;
use crate::domain::recording::RecordingBlob;

use super::dialog::PickerError;
use super::opener::OpenError;

/// Host errors
#[derive(Debug, Clone, Error)]
pub enum HostError {
    #[error("No host running. Start one with: audiorec host")]
    NotRunning,

    #[error("Failed to communicate with host: {0}")]
    Transport(String),

    #[error("Unexpected reply from host: {0}")]
    UnexpectedReply(String),

    #[error("Failed to save recording: {0}")]
    Save(String),

    #[error("Failed to persist preference: {0}")]
    Preference(#[from] PreferenceError),

    #[error("Directory picker failed: {0}")]
    Picker(#[from] PickerError),

    #[error("Failed to open destination: {0}")]
    Open(#[from] OpenError),

    #[error("Host rejected request: {0}")]
    Rejected(String),

    #[error("Could not determine the {0} directory")]
    NoUserDir(&'static str),
}

/// Acknowledgment of a persisted recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRecording {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Port for the host side of the process boundary
#[async_trait]
pub trait HostBoundary: Send + Sync {
    /// Announce a new front-end; returns the current destination directory
    async fn attach(&self) -> Result<PathBuf, HostError>;

    /// Persist a finished recording under the current destination
    async fn save_buffer(&self, blob: RecordingBlob) -> Result<SavedRecording, HostError>;

    /// Let the user pick a new destination.
    ///
    /// Returns `None` when the picker was cancelled; the stored destination
    /// is then left untouched.
    async fn choose_destination(&self) -> Result<Option<PathBuf>, HostError>;
}
