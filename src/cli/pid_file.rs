//! PID file management for the host process

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use nix::sys::signal::kill;
use nix::unistd::Pid;

/// PID file guarding a single host per socket
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// PID file next to the socket (`audiorec.sock` -> `audiorec.pid`)
    pub fn for_socket(socket: &Path) -> Self {
        Self {
            path: socket.with_extension("pid"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the PID file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if another host is already running
    pub fn is_running(&self) -> Option<u32> {
        let mut file = File::open(&self.path).ok()?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).ok()?;
        let pid: u32 = contents.trim().parse().ok()?;

        if pid == process::id() {
            return None;
        }

        // Signal 0 only checks that the process exists
        match kill(Pid::from_raw(pid as i32), None) {
            Ok(()) => Some(pid),
            Err(nix::errno::Errno::ESRCH) => {
                // Stale PID file
                let _ = fs::remove_file(&self.path);
                None
            }
            Err(nix::errno::Errno::EPERM) => Some(pid),
            Err(_) => None,
        }
    }

    /// Acquire the PID file (fails if another host is running)
    pub fn acquire(&self) -> Result<(), PidFileError> {
        if let Some(pid) = self.is_running() {
            return Err(PidFileError::AlreadyRunning(pid));
        }

        let mut file = File::create(&self.path).map_err(|e| {
            PidFileError::WriteFailed(format!("Failed to create PID file: {}", e))
        })?;

        write!(file, "{}", process::id())
            .map_err(|e| PidFileError::WriteFailed(format!("Failed to write PID: {}", e)))?;

        Ok(())
    }

    /// Release the PID file
    pub fn release(&self) -> Result<(), PidFileError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                PidFileError::RemoveFailed(format!("Failed to remove PID file: {}", e))
            })?;
        }
        Ok(())
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        // Best-effort cleanup
        let _ = self.release();
    }
}

/// PID file errors
#[derive(Debug, thiserror::Error)]
pub enum PidFileError {
    #[error("Another host is already running (PID: {0})")]
    AlreadyRunning(u32),

    #[error("Failed to write PID file: {0}")]
    WriteFailed(String),

    #[error("Failed to remove PID file: {0}")]
    RemoveFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_follows_socket() {
        let pid_file = PidFile::for_socket(Path::new("/run/user/1000/audiorec.sock"));
        assert_eq!(pid_file.path(), Path::new("/run/user/1000/audiorec.pid"));
    }

    #[test]
    fn is_running_returns_none_for_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = PidFile::with_path(dir.path().join("nonexistent.pid"));
        assert!(pid_file.is_running().is_none());
    }

    #[test]
    fn acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.pid");
        let pid_file = PidFile::with_path(&path);

        pid_file.acquire().unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            process::id().to_string()
        );

        pid_file.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn garbage_pid_file_is_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.pid");
        fs::write(&path, "not-a-pid").unwrap();

        assert!(PidFile::with_path(&path).is_running().is_none());
    }

    #[test]
    fn live_process_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.pid");
        let mut child = std::process::Command::new("sleep").arg("5").spawn().unwrap();
        fs::write(&path, child.id().to_string()).unwrap();

        let running = PidFile::with_path(&path).is_running();
        let _ = child.kill();
        let _ = child.wait();

        assert_eq!(running, Some(child.id()));
    }
}
