//! Recorded file naming

use std::path::{Path, PathBuf};

use super::blob::ContainerFormat;

/// Location of a recording on disk: `<destination>/<millis>.<ext>`.
///
/// Two recordings stopped within the same millisecond map to the same
/// path; the later write replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFile {
    path: PathBuf,
}

impl RecordedFile {
    /// Name a recording by its save timestamp inside `destination`
    pub fn new(destination: &Path, timestamp_ms: u64, format: ContainerFormat) -> Self {
        Self {
            path: destination.join(format!("{}.{}", timestamp_ms, format.extension())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}
