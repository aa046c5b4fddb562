//! Host app runner

use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::application::ports::{
    DirectoryPicker, FolderOpener, HostBoundary, HostError, PreferenceStore,
};
use crate::application::HostService;
use crate::domain::config::AppConfig;
use crate::domain::recording::{human_readable_size, RecordingBlob};
use crate::infrastructure::preferences::{default_destination, preferences_path};
use crate::infrastructure::{CommandPicker, JsonPreferenceStore, PickerTool, SystemOpener};

use super::app::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
use super::args::HostArgs;
use super::ipc::{Envelope, Request, Response, SocketPath, UnixSocketServer};
use super::pid_file::{PidFile, PidFileError};
use super::presenter::Presenter;
use super::signals::{ShutdownReason, ShutdownSignal};

/// Queued requests before connection tasks wait on the host loop
const REQUEST_QUEUE: usize = 16;

/// Time given to connection tasks to flush their last reply
const REPLY_GRACE: Duration = Duration::from_millis(100);

/// Why the host loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostExit {
    /// A front-end sent `quit`
    Quit,
    /// SIGINT or SIGTERM
    Signal(ShutdownReason),
    /// A preference could not be persisted
    Fatal,
    /// The socket server went away
    Disconnected,
}

impl HostExit {
    pub fn exit_code(&self) -> u8 {
        match self {
            HostExit::Quit | HostExit::Signal(_) => EXIT_SUCCESS,
            HostExit::Fatal | HostExit::Disconnected => EXIT_ERROR,
        }
    }
}

/// Run the host process
pub async fn run_host(args: HostArgs, socket: SocketPath, config: &AppConfig) -> ExitCode {
    let presenter = Presenter::new();

    let picker_name = args
        .picker
        .as_deref()
        .unwrap_or_else(|| config.picker_or_default());
    let tool = match picker_name.parse::<PickerTool>() {
        Ok(tool) => tool,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    // Acquire PID file
    let pid_file = PidFile::for_socket(socket.path());
    if let Err(e) = pid_file.acquire() {
        match e {
            PidFileError::AlreadyRunning(pid) => {
                presenter.error(&format!("Another host is already running (PID: {})", pid));
            }
            _ => {
                presenter.error(&e.to_string());
            }
        }
        return ExitCode::from(EXIT_ERROR);
    }

    let Some(home) = dirs::home_dir() else {
        presenter.error(&HostError::NoUserDir("home").to_string());
        return ExitCode::from(EXIT_ERROR);
    };
    let Some(preferences) = args.preferences.or_else(preferences_path) else {
        presenter.error(&format!(
            "{}; pass --preferences <PATH>",
            HostError::NoUserDir("data")
        ));
        return ExitCode::from(EXIT_ERROR);
    };

    let service = HostService::new(
        JsonPreferenceStore::load_for_home(preferences, &home),
        CommandPicker::new(tool),
        SystemOpener::new(),
        default_destination(&home),
    );

    let mut signals = match ShutdownSignal::new() {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut server = UnixSocketServer::new(socket.clone());
    if let Err(e) = server.bind() {
        presenter.error(&format!("Failed to bind socket: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }
    let server = Arc::new(server);

    let (tx, mut rx) = mpsc::channel(REQUEST_QUEUE);
    let accept = tokio::spawn({
        let server = Arc::clone(&server);
        async move {
            if let Err(e) = server.run(tx).await {
                tracing::error!(error = %e, "socket server stopped");
            }
        }
    });

    presenter.host_status("Started, waiting for front-ends...");
    presenter.info(&format!(
        "PID: {} | Socket: {} | Destination: {}",
        std::process::id(),
        socket.path().display(),
        service.destination().display()
    ));
    tracing::debug!(preferences = %service.preferences_path().display(), "preferences loaded");

    let exit = host_loop(&service, &mut rx, signals.recv(), &presenter).await;

    match exit {
        HostExit::Quit => presenter.host_status("Quit requested, shutting down..."),
        HostExit::Signal(reason) => {
            presenter.host_status(&format!("Received {}, shutting down...", reason))
        }
        HostExit::Fatal => presenter.error("Preferences could not be saved, shutting down"),
        HostExit::Disconnected => presenter.error("Socket server stopped"),
    }

    drop(rx);
    tokio::time::sleep(REPLY_GRACE).await;
    accept.abort();
    server.cleanup();
    let _ = pid_file.release();

    ExitCode::from(exit.exit_code())
}

/// Serve requests one at a time until quit, a signal, or a fatal error
pub async fn host_loop<S, P, O, F>(
    service: &HostService<S, P, O>,
    requests: &mut mpsc::Receiver<Envelope>,
    shutdown: F,
    presenter: &Presenter,
) -> HostExit
where
    S: PreferenceStore,
    P: DirectoryPicker,
    O: FolderOpener,
    F: Future<Output = ShutdownReason>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            reason = &mut shutdown => return HostExit::Signal(reason),
            envelope = requests.recv() => {
                let Some(Envelope { request, reply }) = envelope else {
                    return HostExit::Disconnected;
                };

                let kind = request.kind();
                let (response, exit) = dispatch(service, request).await;
                report(presenter, kind, &response);

                if reply.send(response).is_err() {
                    tracing::debug!(kind, "client went away before the reply");
                }
                if let Some(exit) = exit {
                    return exit;
                }
            }
        }
    }
}

/// Handle one request; a returned `HostExit` ends the loop after replying
pub async fn dispatch<S, P, O>(
    service: &HostService<S, P, O>,
    request: Request,
) -> (Response, Option<HostExit>)
where
    S: PreferenceStore,
    P: DirectoryPicker,
    O: FolderOpener,
{
    match request {
        Request::OpenNewWindow => match service.attach().await {
            Ok(destination) => (Response::DestPathUpdate { destination }, None),
            Err(e) => failure(e),
        },
        Request::SaveBuffer { data } => {
            match service.save_buffer(RecordingBlob::webm(data)).await {
                Ok(saved) => (
                    Response::Saved {
                        path: saved.path,
                        bytes: saved.bytes,
                    },
                    None,
                ),
                Err(e) => failure(e),
            }
        }
        Request::ShowDialog => match service.choose_destination().await {
            Ok(Some(destination)) => (Response::DestPathUpdate { destination }, None),
            Ok(None) => (
                Response::DialogCancelled {
                    destination: service.destination(),
                },
                None,
            ),
            Err(e) => failure(e),
        },
        Request::OpenDestination => match service.open_destination().await {
            Ok(_) => (Response::Ok, None),
            Err(e) => failure(e),
        },
        Request::PreferencesPath => (
            Response::PreferencesPath {
                path: service.preferences_path(),
            },
            None,
        ),
        Request::Quit => (Response::Ok, Some(HostExit::Quit)),
    }
}

fn failure(error: HostError) -> (Response, Option<HostExit>) {
    let exit = match error {
        HostError::Preference(_) => Some(HostExit::Fatal),
        _ => None,
    };
    (Response::error(error.to_string()), exit)
}

fn report(presenter: &Presenter, kind: &str, response: &Response) {
    match response {
        Response::Saved { path, bytes } => presenter.success(&format!(
            "Saved {} ({})",
            path.display(),
            human_readable_size(*bytes)
        )),
        Response::DestPathUpdate { destination } if kind == "show-dialog" => {
            presenter.info(&format!("Destination: {}", destination.display()))
        }
        Response::Error { message } => {
            tracing::warn!(kind, %message, "request failed");
            presenter.error(message);
        }
        _ => tracing::debug!(kind, "request served"),
    }
}
