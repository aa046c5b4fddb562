//! Interactive recorder front-end

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::application::ports::{AudioCapture, HostBoundary, InputDevices};
use crate::application::{CapturePipeline, PipelineError, ToggleOutcome};
use crate::domain::capture::{
    format_elapsed, initial_device, resolve_device, CaptureState, DeviceId, SessionConfig,
};
use crate::domain::config::AppConfig;
use crate::domain::recording::human_readable_size;
use crate::infrastructure::CpalCapture;

use super::app::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
use super::ipc::{HostClient, SocketPath};
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Spinner refresh interval while recording
const TICK: Duration = Duration::from_millis(50);

const HELP: &[&str] = &[
    "<Enter>        start / stop recording",
    "devices        list input devices",
    "use <id|n>     select the device for the next recording",
    "q, quit        stop (saving any recording) and exit",
];

/// One line typed at the recorder prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordCommand {
    Toggle,
    Devices,
    Use(String),
    Help,
    Quit,
    Unknown(String),
}

/// Parse a prompt line
pub fn parse_command(line: &str) -> RecordCommand {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "" => RecordCommand::Toggle,
        "devices" | "ls" => RecordCommand::Devices,
        "use" if !rest.is_empty() => RecordCommand::Use(rest.to_string()),
        "help" | "?" => RecordCommand::Help,
        "q" | "quit" | "exit" => RecordCommand::Quit,
        _ => RecordCommand::Unknown(line.to_string()),
    }
}

/// Whether the prompt loop keeps going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Front-end state: the pipeline plus the device chosen for the next session
pub struct Recorder<C, H>
where
    C: AudioCapture + InputDevices,
    H: HostBoundary,
{
    pipeline: CapturePipeline<C, H>,
    selected: DeviceId,
}

impl<C, H> Recorder<C, H>
where
    C: AudioCapture + InputDevices,
    H: HostBoundary,
{
    pub fn new(pipeline: CapturePipeline<C, H>, selected: DeviceId) -> Self {
        Self { pipeline, selected }
    }

    /// Device used by the next `start`
    pub fn selected(&self) -> &DeviceId {
        &self.selected
    }

    pub fn pipeline(&self) -> &CapturePipeline<C, H> {
        &self.pipeline
    }

    /// Execute one prompt command
    pub async fn handle(&mut self, command: RecordCommand, presenter: &mut Presenter) -> Flow {
        match command {
            RecordCommand::Toggle => self.toggle(presenter).await,
            RecordCommand::Devices => self.list_devices(presenter),
            RecordCommand::Use(selector) => self.select(&selector, presenter).await,
            RecordCommand::Help => {
                for line in HELP {
                    presenter.info(line);
                }
            }
            RecordCommand::Quit => return Flow::Exit,
            RecordCommand::Unknown(line) => {
                presenter.warn(&format!("Unknown command '{}'. Type 'help'", line));
            }
        }
        Flow::Continue
    }

    /// Stop and save a running session before exit
    pub async fn finish(&mut self, presenter: &mut Presenter) -> Result<(), PipelineError> {
        if self.pipeline.state().await == CaptureState::Idle {
            return Ok(());
        }

        match self.pipeline.stop().await {
            Ok(outcome) => {
                presenter.spinner_success(&format!(
                    "Saved {} ({}, {})",
                    outcome.saved.path.display(),
                    human_readable_size(outcome.saved.bytes),
                    format_elapsed(outcome.duration_ms)
                ));
                Ok(())
            }
            Err(e) => {
                presenter.spinner_fail(&e.to_string());
                Err(e)
            }
        }
    }

    /// Refresh the elapsed-time display
    pub async fn tick(&self, presenter: &Presenter) {
        if presenter.is_spinning() {
            presenter.update_recording(&self.pipeline.status().await);
        }
    }

    async fn toggle(&mut self, presenter: &mut Presenter) {
        let config = SessionConfig::new(self.selected.clone());

        match self.pipeline.toggle(&config).await {
            Ok(ToggleOutcome::Started { .. }) => {
                presenter.start_spinner("");
                presenter.update_recording(&self.pipeline.status().await);
            }
            Ok(ToggleOutcome::Stopped(outcome)) => {
                presenter.spinner_success(&format!(
                    "Saved {} ({}, {})",
                    outcome.saved.path.display(),
                    human_readable_size(outcome.saved.bytes),
                    format_elapsed(outcome.duration_ms)
                ));
            }
            Err(e) if presenter.is_spinning() => presenter.spinner_fail(&e.to_string()),
            Err(e) => presenter.error(&e.to_string()),
        }
    }

    fn list_devices(&self, presenter: &Presenter) {
        match self.pipeline.capture().input_devices() {
            Ok(devices) => presenter.device_list(&devices, Some(&self.selected)),
            Err(e) => presenter.error(&e.to_string()),
        }
    }

    async fn select(&mut self, selector: &str, presenter: &Presenter) {
        let devices = match self.pipeline.capture().input_devices() {
            Ok(devices) => devices,
            Err(e) => {
                presenter.error(&e.to_string());
                return;
            }
        };

        match resolve_device(&devices, selector) {
            Ok(device) => {
                self.selected = device;
                if self.pipeline.state().await == CaptureState::Recording {
                    presenter.info(&format!(
                        "Using {} from the next recording",
                        self.selected
                    ));
                } else {
                    presenter.info(&format!("Using {}", self.selected));
                }
            }
            Err(e) => presenter.error(&e.to_string()),
        }
    }
}

/// Forward lines from `input` over a channel, read on a dedicated thread.
///
/// The thread is never joined: a read blocked on an idle terminal must not
/// keep the process alive once the recorder has saved and returned.
fn spawn_line_reader<R>(input: R) -> io::Result<mpsc::UnboundedReceiver<io::Result<String>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("audiorec-stdin".to_string())
        .spawn(move || {
            for line in input.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// List input devices, marking the one `record` would start with
pub fn run_devices(config: &AppConfig, presenter: &Presenter) -> ExitCode {
    let devices = match CpalCapture::default().input_devices() {
        Ok(devices) => devices,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let selected = config
        .device
        .as_deref()
        .and_then(|selector| resolve_device(&devices, selector).ok())
        .or_else(|| initial_device(&devices));
    presenter.device_list(&devices, selected.as_ref());

    ExitCode::from(EXIT_SUCCESS)
}

/// Run the interactive recorder
pub async fn run_record(socket: SocketPath, config: &AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    let host = HostClient::new(socket);
    let destination = match host.attach().await {
        Ok(destination) => destination,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let capture = CpalCapture::new(config.bitrate_or_default(), config.timeslice_ms_or_default());
    let devices = match capture.input_devices() {
        Ok(devices) => devices,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let selected = match config.device.as_deref() {
        Some(selector) => match resolve_device(&devices, selector) {
            Ok(device) => device,
            Err(e) => {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        },
        None => match initial_device(&devices) {
            Some(device) => device,
            None => {
                presenter.error("No audio input device available");
                return ExitCode::from(EXIT_ERROR);
            }
        },
    };

    let mut signals = match ShutdownSignal::new() {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.info(&format!("Saving to {}", destination.display()));
    presenter.device_list(&devices, Some(&selected));
    presenter.info("Press Enter to start/stop recording, 'help' for commands");

    let mut lines = match spawn_line_reader(io::BufReader::new(io::stdin())) {
        Ok(lines) => lines,
        Err(e) => {
            presenter.error(&format!("Failed to read stdin: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut recorder = Recorder::new(CapturePipeline::new(capture, host), selected);
    let mut ticker = tokio::time::interval(TICK);

    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(Ok(line)) => {
                    if recorder.handle(parse_command(&line), &mut presenter).await == Flow::Exit {
                        break;
                    }
                }
                None => break,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "failed to read stdin");
                    break;
                }
            },
            reason = signals.recv() => {
                tracing::debug!(%reason, "recorder interrupted");
                break;
            }
            _ = ticker.tick() => recorder.tick(&presenter).await,
        }
    }

    match recorder.finish(&mut presenter).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(_) => ExitCode::from(EXIT_ERROR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::application::ports::{CaptureError, ChunkSender, HostError, SavedRecording};
    use crate::domain::capture::{EncodedChunk, InputDevice};
    use crate::domain::recording::RecordingBlob;

    #[derive(Default)]
    struct FakeCapture {
        started: Mutex<Vec<DeviceId>>,
    }

    impl InputDevices for FakeCapture {
        fn input_devices(&self) -> Result<Vec<InputDevice>, CaptureError> {
            Ok(["pulse", "USB Mic"]
                .iter()
                .enumerate()
                .map(|(i, name)| InputDevice {
                    id: DeviceId::new(*name),
                    label: name.to_string(),
                    is_default: i == 0,
                })
                .collect())
        }
    }

    #[async_trait]
    impl AudioCapture for FakeCapture {
        async fn start(&self, device: &DeviceId, chunks: ChunkSender) -> Result<(), CaptureError> {
            self.started.lock().unwrap().push(device.clone());
            let _ = chunks.send(EncodedChunk::new(vec![0x1A, 0x45]));
            Ok(())
        }

        async fn stop(&self) -> Result<(), CaptureError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeHost {
        saved: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl HostBoundary for FakeHost {
        async fn attach(&self) -> Result<PathBuf, HostError> {
            Ok(PathBuf::from("/rec"))
        }

        async fn save_buffer(&self, blob: RecordingBlob) -> Result<SavedRecording, HostError> {
            let bytes = blob.size_bytes();
            self.saved.lock().unwrap().push(bytes);
            Ok(SavedRecording {
                path: PathBuf::from("/rec/1.webm"),
                bytes,
            })
        }

        async fn choose_destination(&self) -> Result<Option<PathBuf>, HostError> {
            Ok(None)
        }
    }

    fn recorder() -> Recorder<FakeCapture, FakeHost> {
        Recorder::new(
            CapturePipeline::new(FakeCapture::default(), FakeHost::default()),
            DeviceId::new("pulse"),
        )
    }

    /// Never yields data until the sender side is dropped
    struct IdleTerminal(std::sync::mpsc::Receiver<()>);

    impl io::Read for IdleTerminal {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[test]
    fn display_refreshes_every_50ms() {
        assert_eq!(TICK, Duration::from_millis(50));
    }

    #[tokio::test]
    async fn line_reader_forwards_lines_then_closes() {
        let mut lines = spawn_line_reader(io::Cursor::new("use 1\n\nq\n")).unwrap();

        assert_eq!(lines.recv().await.unwrap().unwrap(), "use 1");
        assert_eq!(lines.recv().await.unwrap().unwrap(), "");
        assert_eq!(lines.recv().await.unwrap().unwrap(), "q");
        assert!(lines.recv().await.is_none());
    }

    #[test]
    fn idle_stdin_does_not_block_runtime_shutdown() {
        let (_keep_open, idle) = std::sync::mpsc::channel::<()>();
        let (done_tx, done_rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let mut lines = spawn_line_reader(io::BufReader::new(IdleTerminal(idle))).unwrap();
                let waited = tokio::time::timeout(Duration::from_millis(20), lines.recv()).await;
                assert!(waited.is_err());
            });
            drop(runtime);
            let _ = done_tx.send(());
        });

        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn empty_line_toggles() {
        assert_eq!(parse_command(""), RecordCommand::Toggle);
        assert_eq!(parse_command("   "), RecordCommand::Toggle);
    }

    #[test]
    fn use_takes_the_rest_of_the_line() {
        assert_eq!(
            parse_command("use USB Mic"),
            RecordCommand::Use("USB Mic".to_string())
        );
        assert_eq!(parse_command("use 1"), RecordCommand::Use("1".to_string()));
        assert!(matches!(parse_command("use"), RecordCommand::Unknown(_)));
    }

    #[test]
    fn quit_aliases() {
        for word in ["q", "quit", "exit", " quit "] {
            assert_eq!(parse_command(word), RecordCommand::Quit);
        }
    }

    #[test]
    fn other_commands() {
        assert_eq!(parse_command("devices"), RecordCommand::Devices);
        assert_eq!(parse_command("help"), RecordCommand::Help);
        assert_eq!(
            parse_command("record now"),
            RecordCommand::Unknown("record now".to_string())
        );
    }

    #[tokio::test]
    async fn toggle_twice_saves_one_recording() {
        let mut recorder = recorder();
        let mut presenter = Presenter::new();

        recorder.handle(RecordCommand::Toggle, &mut presenter).await;
        assert_eq!(recorder.pipeline().state().await, CaptureState::Recording);

        recorder.handle(RecordCommand::Toggle, &mut presenter).await;
        assert_eq!(recorder.pipeline().state().await, CaptureState::Idle);
        assert_eq!(*recorder.pipeline().host().saved.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn use_changes_device_for_next_session_only() {
        let mut recorder = recorder();
        let mut presenter = Presenter::new();

        recorder.handle(RecordCommand::Toggle, &mut presenter).await;
        recorder
            .handle(RecordCommand::Use("1".to_string()), &mut presenter)
            .await;
        assert_eq!(recorder.selected(), &DeviceId::new("USB Mic"));

        recorder.handle(RecordCommand::Toggle, &mut presenter).await;
        recorder.handle(RecordCommand::Toggle, &mut presenter).await;

        let started = recorder.pipeline().capture().started.lock().unwrap().clone();
        assert_eq!(started, vec![DeviceId::new("pulse"), DeviceId::new("USB Mic")]);
    }

    #[tokio::test]
    async fn unknown_device_keeps_selection() {
        let mut recorder = recorder();
        let mut presenter = Presenter::new();

        recorder
            .handle(RecordCommand::Use("Line In".to_string()), &mut presenter)
            .await;

        assert_eq!(recorder.selected(), &DeviceId::new("pulse"));
    }

    #[tokio::test]
    async fn quit_exits_and_finish_saves_active_session() {
        let mut recorder = recorder();
        let mut presenter = Presenter::new();

        recorder.handle(RecordCommand::Toggle, &mut presenter).await;
        let flow = recorder.handle(RecordCommand::Quit, &mut presenter).await;
        assert_eq!(flow, Flow::Exit);

        recorder.finish(&mut presenter).await.unwrap();
        assert_eq!(recorder.pipeline().state().await, CaptureState::Idle);
        assert_eq!(recorder.pipeline().host().saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn finish_while_idle_saves_nothing() {
        let mut recorder = recorder();
        let mut presenter = Presenter::new();

        recorder.finish(&mut presenter).await.unwrap();
        assert!(recorder.pipeline().host().saved.lock().unwrap().is_empty());
    }
}
