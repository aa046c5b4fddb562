//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// Default length of one encoded chunk
pub const DEFAULT_TIMESLICE_MS: u64 = 1000;

/// Accepted chunk lengths. The upper bound keeps block offsets inside a
/// WebM cluster within a signed 16-bit millisecond range.
pub const TIMESLICE_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=30_000;

/// Default Opus bitrate in bits per second
pub const DEFAULT_BITRATE: u32 = 48_000;

/// Bitrates accepted by libopus
pub const BITRATE_RANGE: std::ops::RangeInclusive<u32> = 6_000..=510_000;

/// Default directory picker tool
pub const DEFAULT_PICKER: &str = "zenity";

/// Supported directory picker tools
pub const VALID_PICKERS: &[&str] = &["zenity", "kdialog"];

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub device: Option<String>,
    pub timeslice_ms: Option<u64>,
    pub bitrate: Option<u32>,
    pub picker: Option<String>,
}

impl AppConfig {
    /// Create config with default values.
    ///
    /// `device` stays unset: the first enumerated device is used.
    pub fn defaults() -> Self {
        Self {
            device: None,
            timeslice_ms: Some(DEFAULT_TIMESLICE_MS),
            bitrate: Some(DEFAULT_BITRATE),
            picker: Some(DEFAULT_PICKER.to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            device: other.device.or(self.device),
            timeslice_ms: other.timeslice_ms.or(self.timeslice_ms),
            bitrate: other.bitrate.or(self.bitrate),
            picker: other.picker.or(self.picker),
        }
    }

    /// Reject values outside the accepted ranges.
    ///
    /// Unset fields are fine; `picker` is compared case-insensitively.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ms) = self.timeslice_ms.filter(|ms| !TIMESLICE_RANGE_MS.contains(ms)) {
            return Err(out_of_range("timeslice_ms", ms, &TIMESLICE_RANGE_MS));
        }
        if let Some(bps) = self.bitrate.filter(|b| !BITRATE_RANGE.contains(b)) {
            return Err(out_of_range("bitrate", bps, &BITRATE_RANGE));
        }
        if let Some(picker) = &self.picker {
            if known_picker(picker).is_none() {
                return Err(ConfigError::ValidationError {
                    key: "picker".to_string(),
                    message: format!(
                        "Invalid value '{}'. Valid options: {}",
                        picker,
                        VALID_PICKERS.join(", ")
                    ),
                });
            }
        }
        Ok(())
    }

    /// Get the timeslice, or the default if unset or out of range
    pub fn timeslice_ms_or_default(&self) -> u64 {
        self.timeslice_ms
            .filter(|ms| TIMESLICE_RANGE_MS.contains(ms))
            .unwrap_or(DEFAULT_TIMESLICE_MS)
    }

    /// Get the bitrate, or the default if unset or out of range
    pub fn bitrate_or_default(&self) -> u32 {
        self.bitrate
            .filter(|b| BITRATE_RANGE.contains(b))
            .unwrap_or(DEFAULT_BITRATE)
    }

    /// Get the picker tool, or "zenity" if unset or unknown
    pub fn picker_or_default(&self) -> &'static str {
        self.picker
            .as_deref()
            .and_then(known_picker)
            .unwrap_or(DEFAULT_PICKER)
    }
}

fn known_picker(name: &str) -> Option<&'static str> {
    VALID_PICKERS
        .iter()
        .copied()
        .find(|valid| valid.eq_ignore_ascii_case(name))
}

fn out_of_range<T: std::fmt::Display>(
    key: &str,
    value: T,
    range: &std::ops::RangeInclusive<T>,
) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: format!(
            "{} is outside {}..={}",
            value,
            range.start(),
            range.end()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert!(config.device.is_none());
        assert_eq!(config.timeslice_ms, Some(1000));
        assert_eq!(config.bitrate, Some(48_000));
        assert_eq!(config.picker, Some("zenity".to_string()));
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.device.is_none());
        assert!(config.timeslice_ms.is_none());
        assert!(config.bitrate.is_none());
        assert!(config.picker.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            device: Some("pulse".to_string()),
            timeslice_ms: Some(500),
            ..Default::default()
        };
        let other = AppConfig {
            device: Some("USB Mic".to_string()),
            timeslice_ms: None,
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.device, Some("USB Mic".to_string()));
        assert_eq!(merged.timeslice_ms, Some(500));
    }

    #[test]
    fn merge_preserves_base_when_other_is_empty() {
        let merged = AppConfig::defaults().merge(AppConfig::empty());
        assert_eq!(merged, AppConfig::defaults());
    }

    #[test]
    fn out_of_range_values_fall_back() {
        let config = AppConfig {
            timeslice_ms: Some(50),
            bitrate: Some(1_000_000),
            picker: Some("finder".to_string()),
            ..Default::default()
        };
        assert_eq!(config.timeslice_ms_or_default(), DEFAULT_TIMESLICE_MS);
        assert_eq!(config.bitrate_or_default(), DEFAULT_BITRATE);
        assert_eq!(config.picker_or_default(), "zenity");
    }

    #[test]
    fn validate_accepts_partial_and_default_configs() {
        assert!(AppConfig::empty().validate().is_ok());
        assert!(AppConfig::defaults().validate().is_ok());
        let upper = AppConfig {
            picker: Some("KDialog".to_string()),
            ..Default::default()
        };
        assert!(upper.validate().is_ok());
    }

    #[test]
    fn validate_names_the_bad_key() {
        let cases = [
            AppConfig {
                timeslice_ms: Some(40_000),
                ..Default::default()
            },
            AppConfig {
                bitrate: Some(1_000),
                ..Default::default()
            },
            AppConfig {
                picker: Some("finder".to_string()),
                ..Default::default()
            },
        ];
        for (config, expected) in cases.iter().zip(["timeslice_ms", "bitrate", "picker"]) {
            match config.validate() {
                Err(ConfigError::ValidationError { key, .. }) => assert_eq!(key, expected),
                other => panic!("expected validation error for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn configured_values_are_used() {
        let config = AppConfig {
            timeslice_ms: Some(250),
            bitrate: Some(24_000),
            picker: Some("kdialog".to_string()),
            ..Default::default()
        };
        assert_eq!(config.timeslice_ms_or_default(), 250);
        assert_eq!(config.bitrate_or_default(), 24_000);
        assert_eq!(config.picker_or_default(), "kdialog");
    }
}
