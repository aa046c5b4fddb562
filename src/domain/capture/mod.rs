//! Capture domain module

mod device;
mod elapsed;
mod lifecycle;
mod session;

pub use device::{initial_device, resolve_device, DeviceId, InputDevice, SessionConfig};
pub use elapsed::format_elapsed;
pub use lifecycle::{CaptureLifecycle, CaptureState, InvalidStateTransition};
pub use session::{CaptureSession, EncodedChunk};
