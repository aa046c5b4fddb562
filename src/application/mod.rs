//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod capture;
pub mod host;
pub mod ports;

// Re-export use cases
pub use capture::{CapturePipeline, PipelineError, PipelineStatus, StopOutcome, ToggleOutcome};
pub use host::HostService;
