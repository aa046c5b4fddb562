//! Recording blob value object

use std::fmt;

/// Container formats a recording can be delivered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerFormat {
    /// WebM holding Opus audio
    #[default]
    Webm,
}

impl ContainerFormat {
    /// Get the MIME type string, including the codec
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Webm => "audio/webm; codecs=opus",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Webm => "webm",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

/// Immutable bytes of one finished recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingBlob {
    data: Vec<u8>,
    format: ContainerFormat,
}

impl RecordingBlob {
    /// Create a blob from raw bytes
    pub fn new(data: Vec<u8>, format: ContainerFormat) -> Self {
        Self { data, format }
    }

    /// Create a WebM blob
    pub fn webm(data: Vec<u8>) -> Self {
        Self::new(data, ContainerFormat::Webm)
    }

    /// Get the raw bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw bytes
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn format(&self) -> ContainerFormat {
        self.format
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        human_readable_size(self.size_bytes())
    }
}

/// Format a byte count as B / KB / MB
pub fn human_readable_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
