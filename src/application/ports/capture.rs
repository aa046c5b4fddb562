//! Audio capture port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::capture::{DeviceId, EncodedChunk, InputDevice};

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("No audio input device available")]
    NoAudioDevice,

    #[error("Input device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to enumerate input devices: {0}")]
    EnumerationFailed(String),

    #[error("Failed to open input stream: {0}")]
    StartFailed(String),

    #[error("Encoder failed: {0}")]
    EncodingFailed(String),

    #[error("Failed to stop recording: {0}")]
    StopFailed(String),

    #[error("No recording in progress")]
    NotRecording,
}

/// Channel on which an active capture delivers its encoded chunks.
/// The capture drops its sender once the final chunk has been flushed.
pub type ChunkSender = mpsc::UnboundedSender<EncodedChunk>;

/// Port for enumerating audio input devices
pub trait InputDevices: Send + Sync {
    /// List input devices in platform order
    fn input_devices(&self) -> Result<Vec<InputDevice>, CaptureError>;
}

/// Port for time-sliced, encoded audio capture
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Open the input stream on `device` and start emitting encoded chunks on `chunks`.
    ///
    /// Returns once the stream is running, or with the reason it could not be opened.
    async fn start(&self, device: &DeviceId, chunks: ChunkSender) -> Result<(), CaptureError>;

    /// Stop the encoder.
    ///
    /// Resolves after the last chunk has been flushed and the chunk sender dropped.
    async fn stop(&self) -> Result<(), CaptureError>;
}
