//! One-shot commands sent to a running host via IPC

use std::path::PathBuf;

use crate::application::ports::{HostBoundary, HostError};
use crate::infrastructure::preferences::{default_destination, preferences_path};
use crate::infrastructure::JsonPreferenceStore;

use super::args::PreferencesAction;
use super::ipc::{HostClient, SocketPath};
use super::presenter::Presenter;

/// Handle `audiorec preferences <action>`.
///
/// `file` is only consulted when no host answers.
pub async fn handle_preferences_command(
    action: PreferencesAction,
    file: Option<PathBuf>,
    socket: SocketPath,
    presenter: &Presenter,
) -> Result<(), HostError> {
    let host = HostClient::new(socket);
    match action {
        PreferencesAction::Show => {
            let destination = current_destination(&host, file).await?;
            presenter.output(&destination.to_string_lossy());
            Ok(())
        }
        PreferencesAction::Choose => {
            match host.choose_destination().await? {
                Some(destination) => {
                    presenter.success("Destination updated");
                    presenter.output(&destination.to_string_lossy());
                }
                None => {
                    let destination = host.attach().await?;
                    presenter.info("Dialog cancelled, destination unchanged");
                    presenter.output(&destination.to_string_lossy());
                }
            }
            Ok(())
        }
        PreferencesAction::Path => {
            let path = match host.preferences_path().await {
                Ok(path) => path,
                Err(HostError::NotRunning) => local_preferences_file(file)?,
                Err(e) => return Err(e),
            };
            presenter.output(&path.to_string_lossy());
            Ok(())
        }
    }
}

/// Handle `audiorec open-destination`
pub async fn handle_open_destination(
    socket: SocketPath,
    presenter: &Presenter,
) -> Result<(), HostError> {
    HostClient::new(socket).open_destination().await?;
    presenter.info("Opened destination folder");
    Ok(())
}

/// Handle `audiorec quit`
pub async fn handle_quit(socket: SocketPath, presenter: &Presenter) -> Result<(), HostError> {
    HostClient::new(socket).quit().await?;
    presenter.success("Host stopped");
    Ok(())
}

/// `file`, or the default preference file
fn local_preferences_file(file: Option<PathBuf>) -> Result<PathBuf, HostError> {
    file.or_else(preferences_path)
        .ok_or(HostError::NoUserDir("data"))
}

/// Destination as the host sees it, or as stored on disk when no host runs
async fn current_destination<H: HostBoundary>(
    host: &H,
    file: Option<PathBuf>,
) -> Result<PathBuf, HostError> {
    match host.attach().await {
        Ok(destination) => Ok(destination),
        Err(HostError::NotRunning) => {
            let path = local_preferences_file(file)?;
            let home = dirs::home_dir().ok_or(HostError::NoUserDir("home"))?;
            tracing::debug!(path = %path.display(), "no host running, reading preference file");
            Ok(JsonPreferenceStore::load_for_home(path, &home)
                .destination()
                .unwrap_or_else(|| default_destination(&home)))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::application::ports::SavedRecording;
    use crate::domain::recording::RecordingBlob;

    struct StubHost(Result<PathBuf, HostError>);

    #[async_trait]
    impl HostBoundary for StubHost {
        async fn attach(&self) -> Result<PathBuf, HostError> {
            self.0.clone()
        }

        async fn save_buffer(&self, _blob: RecordingBlob) -> Result<SavedRecording, HostError> {
            Err(HostError::NotRunning)
        }

        async fn choose_destination(&self) -> Result<Option<PathBuf>, HostError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn running_host_answers() {
        let host = StubHost(Ok(PathBuf::from("/mnt/rec")));
        assert_eq!(
            current_destination(&host, None).await.unwrap(),
            PathBuf::from("/mnt/rec")
        );
    }

    #[tokio::test]
    async fn missing_host_reads_given_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.json");
        std::fs::write(&file, r#"{"destination":"/srv/takes"}"#).unwrap();

        let host = StubHost(Err(HostError::NotRunning));
        assert_eq!(
            current_destination(&host, Some(file)).await.unwrap(),
            PathBuf::from("/srv/takes")
        );
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let host = StubHost(Err(HostError::Transport("reset".to_string())));
        assert!(matches!(
            current_destination(&host, None).await,
            Err(HostError::Transport(_))
        ));
    }

    #[test]
    fn given_file_wins_over_default_location() {
        let file = PathBuf::from("/etc/audiorec/prefs.json");
        assert_eq!(local_preferences_file(Some(file.clone())).unwrap(), file);
    }

    #[tokio::test]
    async fn path_without_host_prints_given_file() {
        let dir = tempfile::tempdir().unwrap();
        let socket = SocketPath::with_path(dir.path().join("none.sock"));

        let result = handle_preferences_command(
            PreferencesAction::Path,
            Some(dir.path().join("custom.json")),
            socket,
            &Presenter::new(),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn quit_without_host_fails() {
        let dir = tempfile::tempdir().unwrap();
        let socket = SocketPath::with_path(dir.path().join("none.sock"));

        let result = handle_quit(socket, &Presenter::new()).await;
        assert!(matches!(result, Err(HostError::NotRunning)));
    }
}
