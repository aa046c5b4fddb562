//! Preference store adapters

mod json_file;

pub use json_file::{default_destination, preferences_path, JsonPreferenceStore};
