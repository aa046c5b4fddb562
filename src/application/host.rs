//! Host use case
//!
//! Owns the preference store and serves the privileged operations of the
//! process boundary: saving recordings, choosing and opening the destination.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::preferences::DESTINATION_KEY;
use crate::domain::recording::{RecordedFile, RecordingBlob};

use super::ports::{
    Clock, DirectoryPicker, FolderOpener, HostBoundary, HostError, PreferenceStore,
    SavedRecording, SystemClock,
};

/// Host use case
pub struct HostService<S, P, O>
where
    S: PreferenceStore,
    P: DirectoryPicker,
    O: FolderOpener,
{
    preferences: Mutex<S>,
    destination: RwLock<PathBuf>,
    picker: P,
    opener: O,
    clock: Arc<dyn Clock>,
}

impl<S, P, O> HostService<S, P, O>
where
    S: PreferenceStore,
    P: DirectoryPicker,
    O: FolderOpener,
{
    /// Create the service.
    ///
    /// `fallback` is used when the store holds no usable destination.
    pub fn new(preferences: S, picker: P, opener: O, fallback: PathBuf) -> Self {
        Self::with_clock(preferences, picker, opener, fallback, Arc::new(SystemClock))
    }

    /// Create the service with a custom clock
    pub fn with_clock(
        preferences: S,
        picker: P,
        opener: O,
        fallback: PathBuf,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let destination = preferences
            .get(DESTINATION_KEY)
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .unwrap_or(fallback);

        Self {
            preferences: Mutex::new(preferences),
            destination: RwLock::new(destination),
            picker,
            opener,
            clock,
        }
    }

    /// Current destination directory
    pub fn destination(&self) -> PathBuf {
        self.destination
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Location of the backing preference file
    pub fn preferences_path(&self) -> PathBuf {
        self.preferences
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .path()
            .to_path_buf()
    }

    /// Show the destination directory in the file manager
    pub async fn open_destination(&self) -> Result<PathBuf, HostError> {
        let destination = self.destination();
        self.opener.open(&destination).await?;
        Ok(destination)
    }

    fn remember_destination(&self, path: &std::path::Path) -> Result<(), HostError> {
        let value = Value::String(path.to_string_lossy().into_owned());
        self.preferences
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .set(DESTINATION_KEY, value)?;

        *self.destination.write().unwrap_or_else(|e| e.into_inner()) = path.to_path_buf();
        Ok(())
    }
}

#[async_trait]
impl<S, P, O> HostBoundary for HostService<S, P, O>
where
    S: PreferenceStore,
    P: DirectoryPicker,
    O: FolderOpener,
{
    async fn attach(&self) -> Result<PathBuf, HostError> {
        Ok(self.destination())
    }

    async fn save_buffer(&self, blob: RecordingBlob) -> Result<SavedRecording, HostError> {
        let destination = self.destination();
        let file = RecordedFile::new(&destination, self.clock.now_ms(), blob.format());

        tokio::fs::create_dir_all(&destination)
            .await
            .map_err(|e| HostError::Save(format!("{}: {}", destination.display(), e)))?;

        let bytes = blob.size_bytes();
        tokio::fs::write(file.path(), blob.into_data())
            .await
            .map_err(|e| HostError::Save(format!("{}: {}", file.path().display(), e)))?;

        tracing::info!(path = %file.path().display(), bytes, "recording saved");
        Ok(SavedRecording {
            path: file.into_path(),
            bytes,
        })
    }

    async fn choose_destination(&self) -> Result<Option<PathBuf>, HostError> {
        let Some(chosen) = self.picker.pick_directory().await? else {
            tracing::debug!("destination picker cancelled");
            return Ok(None);
        };

        self.remember_destination(&chosen)?;
        tracing::info!(destination = %chosen.display(), "destination changed");
        Ok(Some(chosen))
    }
}
