//! Preference store port interface

use std::path::Path;

use serde_json::Value;

use crate::domain::error::PreferenceError;

/// Port for the key-value preference cache.
///
/// Reads are served from memory; every write persists the full set
/// before returning.
pub trait PreferenceStore: Send {
    /// Look up a value; absent keys yield `None`
    fn get(&self, key: &str) -> Option<&Value>;

    /// Insert or overwrite a value and persist the whole set
    fn set(&mut self, key: &str, value: Value) -> Result<(), PreferenceError>;

    /// Location of the backing file
    fn path(&self) -> &Path;
}
