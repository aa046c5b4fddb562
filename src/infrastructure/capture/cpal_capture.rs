//! Microphone capture using cpal
//!
//! The stream is owned by a dedicated thread since `cpal::Stream` is not
//! `Send`. The audio callback only downmixes and forwards samples; encoding
//! happens on the same thread that owns the stream.

use std::sync::mpsc as std_mpsc;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use tokio::sync::oneshot;

use super::chunk_encoder::{ChunkEncoder, EncoderSettings};
use crate::application::ports::{AudioCapture, CaptureError, ChunkSender, InputDevices};
use crate::domain::capture::{DeviceId, InputDevice};
use crate::domain::config::{DEFAULT_BITRATE, DEFAULT_TIMESLICE_MS};

/// Messages from the audio callback and the controller to the capture thread
enum Feed {
    Samples(Vec<f32>),
    Stop,
}

/// Handle to a running capture thread
struct Worker {
    control: std_mpsc::Sender<Feed>,
    done: oneshot::Receiver<Result<(), CaptureError>>,
}

/// Time-sliced Opus/WebM capture from a cpal input device
pub struct CpalCapture {
    bitrate: u32,
    timeslice_ms: u64,
    worker: StdMutex<Option<Worker>>,
}

impl CpalCapture {
    pub fn new(bitrate: u32, timeslice_ms: u64) -> Self {
        Self {
            bitrate,
            timeslice_ms,
            worker: StdMutex::new(None),
        }
    }

    fn find_device(id: &DeviceId) -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        let mut devices = host
            .input_devices()
            .map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?
            .peekable();

        if devices.peek().is_none() {
            return Err(CaptureError::NoAudioDevice);
        }

        devices
            .find(|d| d.name().map(|n| n == id.as_str()).unwrap_or(false))
            .ok_or_else(|| CaptureError::DeviceNotFound(id.to_string()))
    }

    fn open_stream(
        device: &cpal::Device,
        feed: std_mpsc::Sender<Feed>,
    ) -> Result<(cpal::Stream, u32), CaptureError> {
        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::StartFailed(format!("Failed to get config: {}", e)))?;

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0;

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(device, &config, feed)?,
            SampleFormat::I16 => build_stream::<i16>(device, &config, feed)?,
            SampleFormat::U16 => build_stream::<u16>(device, &config, feed)?,
            SampleFormat::I32 => build_stream::<i32>(device, &config, feed)?,
            other => {
                return Err(CaptureError::StartFailed(format!(
                    "Unsupported sample format: {}",
                    other
                )))
            }
        };

        stream
            .play()
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

        Ok((stream, sample_rate))
    }

    /// Body of the capture thread
    fn run(
        id: DeviceId,
        settings: (u32, u64),
        feed_tx: std_mpsc::Sender<Feed>,
        feed_rx: std_mpsc::Receiver<Feed>,
        chunks: ChunkSender,
        ready: oneshot::Sender<Result<(), CaptureError>>,
    ) -> Result<(), CaptureError> {
        let (bitrate, timeslice_ms) = settings;

        let opened = Self::find_device(&id).and_then(|device| Self::open_stream(&device, feed_tx));
        let (stream, input_rate) = match opened {
            Ok(opened) => opened,
            Err(e) => {
                let _ = ready.send(Err(e));
                return Ok(());
            }
        };

        let encoder = ChunkEncoder::new(EncoderSettings {
            input_rate,
            bitrate,
            timeslice_ms,
        });
        let mut encoder = match encoder {
            Ok(encoder) => encoder,
            Err(e) => {
                let _ = ready.send(Err(CaptureError::EncodingFailed(e.to_string())));
                return Ok(());
            }
        };

        tracing::debug!(device = %id, input_rate, bitrate, timeslice_ms, "input stream running");
        let _ = chunks.send(encoder.header());
        let _ = ready.send(Ok(()));

        let encode = |encoder: &mut ChunkEncoder, samples: &[f32]| {
            encoder
                .encode(samples)
                .map_err(|e| CaptureError::EncodingFailed(e.to_string()))
        };

        while let Ok(feed) = feed_rx.recv() {
            match feed {
                Feed::Samples(samples) => {
                    for chunk in encode(&mut encoder, &samples)? {
                        let _ = chunks.send(chunk);
                    }
                }
                Feed::Stop => break,
            }
        }

        drop(stream);
        while let Ok(Feed::Samples(samples)) = feed_rx.try_recv() {
            for chunk in encode(&mut encoder, &samples)? {
                let _ = chunks.send(chunk);
            }
        }

        let tail = encoder
            .finish()
            .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;
        for chunk in tail {
            let _ = chunks.send(chunk);
        }

        tracing::debug!(device = %id, "input stream closed");
        Ok(())
    }
}

impl Default for CpalCapture {
    fn default() -> Self {
        Self::new(DEFAULT_BITRATE, DEFAULT_TIMESLICE_MS)
    }
}

impl InputDevices for CpalCapture {
    fn input_devices(&self) -> Result<Vec<InputDevice>, CaptureError> {
        let host = cpal::default_host();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());

        let devices = host
            .input_devices()
            .map_err(|e| CaptureError::EnumerationFailed(e.to_string()))?;

        Ok(devices
            .filter_map(|d| d.name().ok())
            .map(|name| InputDevice {
                id: DeviceId::new(name.clone()),
                is_default: default_name.as_deref() == Some(name.as_str()),
                label: name,
            })
            .collect())
    }
}

#[async_trait]
impl AudioCapture for CpalCapture {
    async fn start(&self, device: &DeviceId, chunks: ChunkSender) -> Result<(), CaptureError> {
        if self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
        {
            return Err(CaptureError::StartFailed(
                "Recording already in progress".to_string(),
            ));
        }

        let (feed_tx, feed_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();

        let id = device.clone();
        let callback_feed = feed_tx.clone();
        let settings = (self.bitrate, self.timeslice_ms);

        std::thread::Builder::new()
            .name("audiorec-capture".to_string())
            .spawn(move || {
                let result = Self::run(id, settings, callback_feed, feed_rx, chunks, ready_tx);
                if let Err(e) = &result {
                    tracing::error!(error = %e, "capture thread failed");
                }
                let _ = done_tx.send(result);
            })
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

        ready_rx
            .await
            .map_err(|_| CaptureError::StartFailed("capture thread exited".to_string()))??;

        *self.worker.lock().unwrap_or_else(|e| e.into_inner()) = Some(Worker {
            control: feed_tx,
            done: done_rx,
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(CaptureError::NotRecording)?;

        // The thread may already have exited on an encoder error
        let _ = worker.control.send(Feed::Stop);

        worker
            .done
            .await
            .map_err(|_| CaptureError::StopFailed("capture thread exited".to_string()))?
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    feed: std_mpsc::Sender<Feed>,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let _ = feed.send(Feed::Samples(downmix(data, channels)));
            },
            |err| tracing::error!(error = %err, "audio stream error"),
            None,
        )
        .map_err(|e| CaptureError::StartFailed(e.to_string()))
}

/// Average interleaved frames down to mono f32
fn downmix<T>(data: &[T], channels: usize) -> Vec<f32>
where
    T: Sample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    data.chunks(channels)
        .map(|frame| frame.iter().map(|&s| f32::from_sample(s)).sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_single_channel() {
        let mono = vec![0.1f32, -0.2, 0.3];
        assert_eq!(downmix(&mono, 1), mono);
    }

    #[test]
    fn downmix_two_channels() {
        let stereo = vec![0.5f32, 0.25, -1.0, 1.0];
        assert_eq!(downmix(&stereo, 2), vec![0.375, 0.0]);
    }

    #[test]
    fn downmix_converts_integer_samples() {
        let result = downmix(&[i16::MIN, i16::MIN], 2);
        assert_eq!(result, vec![-1.0]);
    }

    #[tokio::test]
    async fn stop_without_start_fails() {
        let capture = CpalCapture::default();
        assert!(matches!(
            capture.stop().await,
            Err(CaptureError::NotRecording)
        ));
    }
}
