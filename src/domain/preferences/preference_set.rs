//! Preference set value object

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which the recording destination directory is stored
pub const DESTINATION_KEY: &str = "destination";

/// Name of the directory (under the user's home) used when no destination is stored
const DEFAULT_DESTINATION_DIR: &str = "audios";

/// Mapping from preference key to JSON value.
///
/// Keys the application does not know about are kept as-is so that a
/// rewrite of the file never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceSet {
    entries: Map<String, Value>,
}

impl PreferenceSet {
    /// Create an empty preference set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document into a preference set.
    ///
    /// Returns `None` unless the document is a JSON object.
    pub fn from_json(content: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(content).ok()? {
            Value::Object(entries) => Some(Self { entries }),
            _ => None,
        }
    }

    /// Serialize the full mapping to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or overwrite a value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys in storage order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// The stored destination directory, if it is a string
    pub fn destination(&self) -> Option<PathBuf> {
        self.get(DESTINATION_KEY)
            .and_then(Value::as_str)
            .map(PathBuf::from)
    }

    /// Builder-style helper to set the destination
    pub fn with_destination(mut self, destination: impl AsRef<Path>) -> Self {
        self.insert(
            DESTINATION_KEY,
            Value::String(destination.as_ref().to_string_lossy().into_owned()),
        );
        self
    }
}

/// Defaults used when the preference file is missing or unreadable:
/// `{ "destination": "<home>/audios" }`
pub fn default_preferences(home: &Path) -> PreferenceSet {
    PreferenceSet::new().with_destination(home.join(DEFAULT_DESTINATION_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_destination_is_audios_under_home() {
        let prefs = default_preferences(Path::new("/home/u"));
        assert_eq!(prefs.destination(), Some(PathBuf::from("/home/u/audios")));
        assert_eq!(prefs.len(), 1);
    }

    #[test]
    fn from_json_accepts_objects() {
        let prefs = PreferenceSet::from_json(r#"{"destination": "/tmp/out", "theme": 3}"#).unwrap();
        assert_eq!(prefs.destination(), Some(PathBuf::from("/tmp/out")));
        assert_eq!(prefs.get("theme"), Some(&json!(3)));
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(PreferenceSet::from_json("[1, 2]").is_none());
        assert!(PreferenceSet::from_json("\"text\"").is_none());
        assert!(PreferenceSet::from_json("{not json").is_none());
        assert!(PreferenceSet::from_json("").is_none());
    }

    #[test]
    fn non_string_destination_is_ignored() {
        let prefs = PreferenceSet::from_json(r#"{"destination": 42}"#).unwrap();
        assert!(prefs.destination().is_none());
    }

    #[test]
    fn insert_overwrites() {
        let mut prefs = PreferenceSet::new();
        prefs.insert("k", json!("a"));
        prefs.insert("k", json!("b"));
        assert_eq!(prefs.get("k"), Some(&json!("b")));
        assert_eq!(prefs.len(), 1);
    }

    #[test]
    fn to_json_keeps_unknown_keys() {
        let prefs = PreferenceSet::from_json(r#"{"extra": true}"#)
            .unwrap()
            .with_destination("/srv/rec");
        let reparsed = PreferenceSet::from_json(&prefs.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, prefs);
        assert_eq!(reparsed.get("extra"), Some(&json!(true)));
    }
}
