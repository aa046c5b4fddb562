//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like cpal, the filesystem,
//! and desktop dialog tools.

pub mod capture;
pub mod config;
pub mod desktop;
pub mod preferences;

// Re-export adapters
pub use capture::CpalCapture;
pub use config::XdgConfigStore;
pub use desktop::{CommandPicker, PickerTool, SystemOpener};
pub use preferences::JsonPreferenceStore;
