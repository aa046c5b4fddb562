//! Capture pipeline use case
//!
//! Drives one microphone capture at a time: opens the input stream, collects
//! the encoder's chunks while recording, and on stop assembles them into a
//! single blob that is handed to the host for persistence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::domain::capture::{
    CaptureLifecycle, CaptureSession, CaptureState, DeviceId, InvalidStateTransition,
    SessionConfig,
};

use super::ports::{
    AudioCapture, CaptureError, Clock, HostBoundary, HostError, SavedRecording, SystemClock,
};

/// Errors from the capture pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("{0}")]
    Host(#[from] HostError),

    #[error("{0}")]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Chunk collector failed: {0}")]
    Collector(String),
}

/// Result of a completed start-to-stop cycle
#[derive(Debug, Clone)]
pub struct StopOutcome {
    /// Where the host stored the recording
    pub saved: SavedRecording,
    /// Wall-clock length of the session
    pub duration_ms: u64,
    /// Number of encoded chunks assembled into the recording
    pub chunks: usize,
}

/// Result of a toggle
#[derive(Debug, Clone)]
pub enum ToggleOutcome {
    Started {
        device: DeviceId,
        started_at_ms: u64,
    },
    Stopped(StopOutcome),
}

/// Snapshot of the pipeline for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStatus {
    pub state: CaptureState,
    pub device: Option<DeviceId>,
    pub elapsed_ms: u64,
    pub buffered_bytes: usize,
}

struct ActiveCapture {
    device: DeviceId,
    started_at_ms: u64,
    buffered_bytes: Arc<AtomicUsize>,
    collector: JoinHandle<CaptureSession>,
}

#[derive(Default)]
struct PipelineInner {
    lifecycle: CaptureLifecycle,
    active: Option<ActiveCapture>,
}

/// Capture pipeline use case
pub struct CapturePipeline<C, H>
where
    C: AudioCapture,
    H: HostBoundary,
{
    capture: C,
    host: H,
    clock: Arc<dyn Clock>,
    inner: Mutex<PipelineInner>,
}

impl<C, H> CapturePipeline<C, H>
where
    C: AudioCapture,
    H: HostBoundary,
{
    /// Create a pipeline using the system clock
    pub fn new(capture: C, host: H) -> Self {
        Self::with_clock(capture, host, Arc::new(SystemClock))
    }

    /// Create a pipeline with a custom clock
    pub fn with_clock(capture: C, host: H, clock: Arc<dyn Clock>) -> Self {
        Self {
            capture,
            host,
            clock,
            inner: Mutex::new(PipelineInner::default()),
        }
    }

    /// Access the capture adapter
    pub fn capture(&self) -> &C {
        &self.capture
    }

    /// Access the host boundary
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Current capture state
    pub async fn state(&self) -> CaptureState {
        self.inner.lock().await.lifecycle.state()
    }

    /// Current state with elapsed time and buffered size
    pub async fn status(&self) -> PipelineStatus {
        let inner = self.inner.lock().await;
        match inner.active.as_ref() {
            Some(active) => PipelineStatus {
                state: inner.lifecycle.state(),
                device: Some(active.device.clone()),
                elapsed_ms: self.clock.now_ms().saturating_sub(active.started_at_ms),
                buffered_bytes: active.buffered_bytes.load(Ordering::Relaxed),
            },
            None => PipelineStatus {
                state: inner.lifecycle.state(),
                device: None,
                elapsed_ms: 0,
                buffered_bytes: 0,
            },
        }
    }

    /// Start recording if idle, stop and save if recording
    pub async fn toggle(&self, config: &SessionConfig) -> Result<ToggleOutcome, PipelineError> {
        match self.state().await {
            CaptureState::Idle => {
                let started_at_ms = self.start(config).await?;
                Ok(ToggleOutcome::Started {
                    device: config.device.clone(),
                    started_at_ms,
                })
            }
            CaptureState::Recording => Ok(ToggleOutcome::Stopped(self.stop().await?)),
        }
    }

    /// Idle -> Recording.
    ///
    /// The device comes from `config` and stays fixed for this session.
    /// Returns the session start time in ms since epoch.
    pub async fn start(&self, config: &SessionConfig) -> Result<u64, PipelineError> {
        let mut inner = self.inner.lock().await;
        if inner.lifecycle.is_recording() {
            return Err(InvalidStateTransition {
                current_state: CaptureState::Recording,
                action: "start recording".to_string(),
            }
            .into());
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        self.capture.start(&config.device, tx).await?;
        inner.lifecycle.start()?;

        let started_at_ms = self.clock.now_ms();
        let mut session = CaptureSession::begin(config.device.clone(), started_at_ms);
        let buffered_bytes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&buffered_bytes);

        let collector = tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                counter.fetch_add(chunk.len(), Ordering::Relaxed);
                session.push(chunk);
            }
            session
        });

        inner.active = Some(ActiveCapture {
            device: config.device.clone(),
            started_at_ms,
            buffered_bytes,
            collector,
        });

        tracing::info!(device = %config.device, started_at_ms, "capture started");
        Ok(started_at_ms)
    }

    /// Recording -> Idle.
    ///
    /// Waits for the encoder to flush, assembles the chunks into one blob and
    /// hands it to the host. An empty session still produces a save request.
    pub async fn stop(&self) -> Result<StopOutcome, PipelineError> {
        let mut inner = self.inner.lock().await;
        inner.lifecycle.stop()?;
        let active = inner.active.take().ok_or(CaptureError::NotRecording)?;
        let stopped_at_ms = self.clock.now_ms();

        if let Err(e) = self.capture.stop().await {
            active.collector.abort();
            return Err(e.into());
        }

        let mut session = active
            .collector
            .await
            .map_err(|e| PipelineError::Collector(e.to_string()))?;

        let chunks = session.chunk_count();
        let blob = session.drain_into_blob();
        tracing::info!(
            device = %session.device(),
            chunks,
            bytes = blob.size_bytes(),
            "capture stopped"
        );

        let saved = self.host.save_buffer(blob).await?;

        Ok(StopOutcome {
            saved,
            duration_ms: stopped_at_ms.saturating_sub(session.started_at_ms()),
            chunks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ChunkSender;
    use crate::domain::capture::EncodedChunk;
    use crate::domain::recording::RecordingBlob;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicU64;
    use std::sync::Mutex as StdMutex;

    /// Emits `head` chunks on start and `tail` on stop, then closes the channel
    struct MockCapture {
        head: Vec<Vec<u8>>,
        tail: Vec<Vec<u8>>,
        fail_start: bool,
        sender: StdMutex<Option<ChunkSender>>,
        devices_used: StdMutex<Vec<DeviceId>>,
    }

    impl MockCapture {
        fn new(head: Vec<Vec<u8>>, tail: Vec<Vec<u8>>) -> Self {
            Self {
                head,
                tail,
                fail_start: false,
                sender: StdMutex::new(None),
                devices_used: StdMutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail_start: true,
                ..Self::new(Vec::new(), Vec::new())
            }
        }
    }

    #[async_trait]
    impl AudioCapture for MockCapture {
        async fn start(&self, device: &DeviceId, chunks: ChunkSender) -> Result<(), CaptureError> {
            if self.fail_start {
                return Err(CaptureError::DeviceNotFound(device.to_string()));
            }
            self.devices_used.lock().unwrap().push(device.clone());
            for bytes in &self.head {
                chunks.send(EncodedChunk::new(bytes.clone())).unwrap();
            }
            *self.sender.lock().unwrap() = Some(chunks);
            Ok(())
        }

        async fn stop(&self) -> Result<(), CaptureError> {
            let sender = self.sender.lock().unwrap().take();
            let sender = sender.ok_or(CaptureError::NotRecording)?;
            for bytes in &self.tail {
                sender.send(EncodedChunk::new(bytes.clone())).unwrap();
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockHost {
        saved: StdMutex<Vec<RecordingBlob>>,
        fail: bool,
    }

    #[async_trait]
    impl HostBoundary for MockHost {
        async fn attach(&self) -> Result<PathBuf, HostError> {
            Ok(PathBuf::from("/rec"))
        }

        async fn save_buffer(&self, blob: RecordingBlob) -> Result<SavedRecording, HostError> {
            if self.fail {
                return Err(HostError::Save("disk full".to_string()));
            }
            let bytes = blob.size_bytes();
            self.saved.lock().unwrap().push(blob);
            Ok(SavedRecording {
                path: PathBuf::from("/rec/1.webm"),
                bytes,
            })
        }

        async fn choose_destination(&self) -> Result<Option<PathBuf>, HostError> {
            Ok(None)
        }
    }

    struct StepClock(AtomicU64);

    impl Clock for StepClock {
        fn now_ms(&self) -> u64 {
            self.0.fetch_add(500, Ordering::SeqCst)
        }
    }

    fn config(device: &str) -> SessionConfig {
        SessionConfig::new(DeviceId::new(device))
    }

    #[tokio::test]
    async fn start_then_stop_saves_concatenated_chunks() {
        let capture = MockCapture::new(vec![vec![1, 2], vec![3]], vec![vec![4, 5]]);
        let pipeline = CapturePipeline::new(capture, MockHost::default());

        pipeline.start(&config("mic")).await.unwrap();
        assert_eq!(pipeline.state().await, CaptureState::Recording);

        let outcome = pipeline.stop().await.unwrap();
        assert_eq!(pipeline.state().await, CaptureState::Idle);
        assert_eq!(outcome.chunks, 3);
        assert_eq!(outcome.saved.bytes, 5);

        let saved = pipeline.host().saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].data(), &[1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn zero_chunks_still_save() {
        let pipeline = CapturePipeline::new(MockCapture::new(vec![], vec![]), MockHost::default());

        pipeline.start(&config("mic")).await.unwrap();
        let outcome = pipeline.stop().await.unwrap();

        assert_eq!(outcome.chunks, 0);
        let saved = pipeline.host().saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].is_empty());
    }

    #[tokio::test]
    async fn toggle_alternates() {
        let pipeline =
            CapturePipeline::new(MockCapture::new(vec![vec![9]], vec![]), MockHost::default());

        let first = pipeline.toggle(&config("mic")).await.unwrap();
        assert!(matches!(first, ToggleOutcome::Started { .. }));

        let second = pipeline.toggle(&config("mic")).await.unwrap();
        assert!(matches!(second, ToggleOutcome::Stopped(_)));

        let third = pipeline.toggle(&config("mic")).await.unwrap();
        assert!(matches!(third, ToggleOutcome::Started { .. }));
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let pipeline = CapturePipeline::new(MockCapture::new(vec![], vec![]), MockHost::default());

        pipeline.start(&config("mic")).await.unwrap();
        let err = pipeline.start(&config("mic")).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidState(_)));
    }

    #[tokio::test]
    async fn stop_while_idle_is_rejected() {
        let pipeline = CapturePipeline::new(MockCapture::new(vec![], vec![]), MockHost::default());
        let err = pipeline.stop().await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidState(_)));
    }

    #[tokio::test]
    async fn failed_start_stays_idle() {
        let pipeline = CapturePipeline::new(MockCapture::failing(), MockHost::default());

        let err = pipeline.start(&config("ghost")).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Capture(CaptureError::DeviceNotFound(_))
        ));
        assert_eq!(pipeline.state().await, CaptureState::Idle);
        assert!(pipeline.host().saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_failure_is_reported_and_pipeline_returns_to_idle() {
        let host = MockHost {
            fail: true,
            ..Default::default()
        };
        let pipeline = CapturePipeline::new(MockCapture::new(vec![vec![1]], vec![]), host);

        pipeline.start(&config("mic")).await.unwrap();
        let err = pipeline.stop().await.unwrap_err();
        assert!(matches!(err, PipelineError::Host(HostError::Save(_))));
        assert_eq!(pipeline.state().await, CaptureState::Idle);
    }

    #[tokio::test]
    async fn device_is_fixed_per_session() {
        let pipeline = CapturePipeline::new(MockCapture::new(vec![], vec![]), MockHost::default());

        let mut selection = config("first");
        pipeline.start(&selection).await.unwrap();
        selection = config("second");
        assert_eq!(
            pipeline.status().await.device,
            Some(DeviceId::new("first"))
        );
        pipeline.stop().await.unwrap();

        pipeline.start(&selection).await.unwrap();
        pipeline.stop().await.unwrap();

        let used = pipeline.capture.devices_used.lock().unwrap();
        assert_eq!(*used, vec![DeviceId::new("first"), DeviceId::new("second")]);
    }

    #[tokio::test]
    async fn status_reports_elapsed_time() {
        let clock = Arc::new(StepClock(AtomicU64::new(10_000)));
        let pipeline = CapturePipeline::with_clock(
            MockCapture::new(vec![vec![1, 2, 3]], vec![]),
            MockHost::default(),
            clock,
        );

        let idle = pipeline.status().await;
        assert_eq!(idle.state, CaptureState::Idle);
        assert_eq!(idle.elapsed_ms, 0);

        let started_at = pipeline.start(&config("mic")).await.unwrap();
        assert_eq!(started_at, 10_000);

        let status = pipeline.status().await;
        assert_eq!(status.state, CaptureState::Recording);
        assert_eq!(status.elapsed_ms, 500);

        let outcome = pipeline.stop().await.unwrap();
        assert_eq!(outcome.duration_ms, 1_000);
    }
}
