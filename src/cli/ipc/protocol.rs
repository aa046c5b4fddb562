//! Wire messages between front-ends and the host
//!
//! One JSON object per line, tagged by `type`. Binary payloads are base64.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Front-end to host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// A front-end attached and wants the current destination
    #[serde(rename = "open_new_window")]
    OpenNewWindow,

    /// Persist a finished recording
    #[serde(rename = "save_buffer")]
    SaveBuffer {
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },

    /// Run the directory picker
    #[serde(rename = "show-dialog")]
    ShowDialog,

    /// Show the destination in the file manager
    #[serde(rename = "open-destination")]
    OpenDestination,

    /// Ask which preference file the host writes
    #[serde(rename = "preferences-path")]
    PreferencesPath,

    /// Stop the host
    #[serde(rename = "quit")]
    Quit,
}

impl Request {
    /// Message type as written on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Request::OpenNewWindow => "open_new_window",
            Request::SaveBuffer { .. } => "save_buffer",
            Request::ShowDialog => "show-dialog",
            Request::OpenDestination => "open-destination",
            Request::PreferencesPath => "preferences-path",
            Request::Quit => "quit",
        }
    }
}

/// Host to front-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    DestPathUpdate { destination: PathBuf },
    Saved { path: PathBuf, bytes: usize },
    DialogCancelled { destination: PathBuf },
    PreferencesPath { path: PathBuf },
    Ok,
    Error { message: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}

/// Serialize a message as one newline-terminated line
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

/// Parse one line (trailing whitespace ignored)
pub fn decode_line<'a, T: Deserialize<'a>>(line: &'a str) -> Result<T, serde_json::Error> {
    serde_json::from_str(line.trim_end())
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
