//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod capture;
pub mod config;
pub mod error;
pub mod preferences;
pub mod recording;

// Re-export common types
pub use capture::{
    CaptureLifecycle, CaptureSession, CaptureState, DeviceId, EncodedChunk, InputDevice,
    SessionConfig,
};
pub use config::AppConfig;
pub use error::*;
pub use preferences::PreferenceSet;
pub use recording::{RecordedFile, RecordingBlob};
