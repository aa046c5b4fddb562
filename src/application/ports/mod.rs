//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod clock;
pub mod config;
pub mod dialog;
pub mod host;
pub mod opener;
pub mod preferences;

// Re-export common types
pub use capture::{AudioCapture, CaptureError, ChunkSender, InputDevices};
pub use clock::{Clock, SystemClock};
pub use config::ConfigStore;
pub use dialog::{DirectoryPicker, PickerError};
pub use host::{HostBoundary, HostError, SavedRecording};
pub use opener::{FolderOpener, OpenError};
pub use preferences::PreferenceStore;
