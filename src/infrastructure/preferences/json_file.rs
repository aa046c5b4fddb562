//! JSON file preference store adapter

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::application::ports::PreferenceStore;
use crate::domain::error::PreferenceError;
use crate::domain::preferences::{default_preferences, PreferenceSet, DESTINATION_KEY};

const APP_DIR: &str = "audiorec";
const FILE_NAME: &str = "user-preferences.json";

/// Location of the preference file in the per-user data directory.
///
/// `None` when neither `XDG_DATA_HOME` nor the home directory can be resolved.
pub fn preferences_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR).join(FILE_NAME))
}

/// `<home>/audios`, the destination used before the user picks one
pub fn default_destination(home: &Path) -> PathBuf {
    default_preferences(home)
        .destination()
        .unwrap_or_else(|| home.join("audios"))
}

/// Key-value preference cache backed by a single JSON file.
///
/// The file is read once on load; every `set` rewrites it in full.
#[derive(Debug)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: PreferenceSet,
}

impl JsonPreferenceStore {
    /// Load the store from `path`.
    ///
    /// A missing, unreadable or malformed file, or one whose top-level value
    /// is not an object, yields `defaults`. Never fails.
    pub fn load(path: impl Into<PathBuf>, defaults: PreferenceSet) -> Self {
        let path = path.into();

        let values = match fs::read_to_string(&path) {
            Ok(content) => PreferenceSet::from_json(&content).unwrap_or_else(|| {
                tracing::warn!(path = %path.display(), "preference file is not a JSON object, using defaults");
                defaults
            }),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no preference file, using defaults");
                defaults
            }
        };

        Self { path, values }
    }

    /// Load `path` with `{ "destination": "<home>/audios" }` as defaults
    pub fn load_for_home(path: impl Into<PathBuf>, home: &Path) -> Self {
        Self::load(path, default_preferences(home))
    }

    /// All values currently held
    pub fn values(&self) -> &PreferenceSet {
        &self.values
    }

    /// The stored destination directory
    pub fn destination(&self) -> Option<PathBuf> {
        self.values.destination()
    }

    fn persist(&self) -> Result<(), PreferenceError> {
        let content = self
            .values
            .to_json()
            .map_err(|e| PreferenceError::Serialize(e.to_string()))?;

        let write_error = |e: std::io::Error| PreferenceError::Write {
            path: self.path.to_string_lossy().into_owned(),
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(write_error)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            write_error(e)
        })
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), PreferenceError> {
        self.values.insert(key, value);
        self.persist()?;
        if key == DESTINATION_KEY {
            tracing::debug!(path = %self.path.display(), "destination preference written");
        }
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
