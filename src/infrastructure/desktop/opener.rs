//! File-manager opener adapter (xdg-open / open)

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{FolderOpener, OpenError};

#[cfg(target_os = "macos")]
const DEFAULT_PROGRAM: &str = "open";
#[cfg(not(target_os = "macos"))]
const DEFAULT_PROGRAM: &str = "xdg-open";

/// Opens directories with the platform's default handler
pub struct SystemOpener {
    program: String,
}

impl SystemOpener {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Use a custom opener program
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemOpener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FolderOpener for SystemOpener {
    async fn open(&self, path: &Path) -> Result<(), OpenError> {
        let failed = |message: String| OpenError::Failed {
            path: path.to_string_lossy().into_owned(),
            message,
        };

        let status = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    OpenError::ToolNotFound(self.program.clone())
                } else {
                    failed(e.to_string())
                }
            })?;

        if !status.success() {
            return Err(failed(format!(
                "{} exited with status: {}",
                self.program, status
            )));
        }

        Ok(())
    }
}
