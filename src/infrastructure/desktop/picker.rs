//! Directory picker adapter (zenity / kdialog)

use std::ffi::OsString;
use std::fmt;
use std::os::unix::ffi::OsStringExt;
use std::path::PathBuf;
use std::process::Stdio;
use std::str::FromStr;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{DirectoryPicker, PickerError};

const DIALOG_TITLE: &str = "Choose recording destination";

/// Supported picker tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerTool {
    /// GTK dialog
    #[default]
    Zenity,
    /// KDE dialog
    Kdialog,
}

impl PickerTool {
    fn program(&self) -> &'static str {
        match self {
            PickerTool::Zenity => "zenity",
            PickerTool::Kdialog => "kdialog",
        }
    }

    fn args(&self) -> Vec<String> {
        match self {
            PickerTool::Zenity => vec![
                "--file-selection".to_string(),
                "--directory".to_string(),
                format!("--title={}", DIALOG_TITLE),
            ],
            PickerTool::Kdialog => {
                let start = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
                vec![
                    "--getexistingdirectory".to_string(),
                    start.to_string_lossy().into_owned(),
                    "--title".to_string(),
                    DIALOG_TITLE.to_string(),
                ]
            }
        }
    }
}

impl fmt::Display for PickerTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program())
    }
}

/// Error type for parsing a picker tool name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePickerToolError {
    pub value: String,
}

impl fmt::Display for ParsePickerToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid picker '{}'. Valid options: zenity, kdialog",
            self.value
        )
    }
}

impl std::error::Error for ParsePickerToolError {}

impl FromStr for PickerTool {
    type Err = ParsePickerToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zenity" => Ok(PickerTool::Zenity),
            "kdialog" => Ok(PickerTool::Kdialog),
            _ => Err(ParsePickerToolError {
                value: s.to_string(),
            }),
        }
    }
}

/// Directory picker backed by an external dialog tool
pub struct CommandPicker {
    tool: PickerTool,
}

impl CommandPicker {
    pub fn new(tool: PickerTool) -> Self {
        Self { tool }
    }

    pub fn tool(&self) -> PickerTool {
        self.tool
    }
}

impl Default for CommandPicker {
    fn default() -> Self {
        Self::new(PickerTool::default())
    }
}

/// Interpret the dialog's exit code and stdout.
///
/// Both tools exit with 1 when the dialog is cancelled or closed.
fn parse_selection(code: Option<i32>, stdout: &[u8]) -> Result<Option<PathBuf>, PickerError> {
    match code {
        Some(0) => {
            // Raw bytes: directory names need not be UTF-8
            let mut path = stdout.to_vec();
            while matches!(path.last(), Some(b'\n' | b'\r')) {
                path.pop();
            }
            if path.is_empty() {
                Ok(None)
            } else {
                Ok(Some(PathBuf::from(OsString::from_vec(path))))
            }
        }
        Some(1) => Ok(None),
        Some(code) => Err(PickerError::Failed(format!("exited with status {}", code))),
        None => Err(PickerError::Failed("terminated by signal".to_string())),
    }
}

#[async_trait]
impl DirectoryPicker for CommandPicker {
    async fn pick_directory(&self) -> Result<Option<PathBuf>, PickerError> {
        let program = self.tool.program();

        let output = Command::new(program)
            .args(self.tool.args())
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PickerError::ToolNotFound(program.to_string())
                } else {
                    PickerError::Failed(e.to_string())
                }
            })?;

        parse_selection(output.status.code(), &output.stdout)
    }
}
