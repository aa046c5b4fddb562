//! Input device value objects

use std::fmt;

use crate::domain::error::UnknownDeviceError;

/// Identifier of an audio input device (the backend's device name)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An enumerated audio input device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub id: DeviceId,
    pub label: String,
    /// Whether the platform reports this as its default input
    pub is_default: bool,
}

/// Per-session capture settings, fixed for the lifetime of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub device: DeviceId,
}

impl SessionConfig {
    pub fn new(device: DeviceId) -> Self {
        Self { device }
    }
}

/// The device selected before the user makes a choice: the first enumerated one
pub fn initial_device(devices: &[InputDevice]) -> Option<DeviceId> {
    devices.first().map(|d| d.id.clone())
}

/// Resolve a user-supplied selector (list index or device id) against the device list
pub fn resolve_device(
    devices: &[InputDevice],
    selector: &str,
) -> Result<DeviceId, UnknownDeviceError> {
    let selector = selector.trim();

    if let Some(device) = devices.iter().find(|d| d.id.as_str() == selector) {
        return Ok(device.id.clone());
    }

    selector
        .parse::<usize>()
        .ok()
        .and_then(|index| devices.get(index))
        .map(|d| d.id.clone())
        .ok_or_else(|| UnknownDeviceError {
            input: selector.to_string(),
        })
}
