//! Streaming Opus encoder
//!
//! - Sample rate: 48kHz (Opus native rate, no decoder-side resampling)
//! - Channels: Mono
//! - Frames: 20ms (960 samples)
//! - Bitrate: configurable, VBR

use thiserror::Error;

/// Sample rate fed to the encoder
pub const OPUS_SAMPLE_RATE: u32 = 48_000;

/// Opus frame size in samples (20ms at 48kHz)
pub const FRAME_SIZE: usize = 960;

/// Frame length in milliseconds
pub const FRAME_MS: u64 = 20;

/// Encoder delay in samples written to OpusHead
pub const PRE_SKIP: u16 = 312;

/// Largest packet libopus will produce
const MAX_PACKET_SIZE: usize = 4000;

/// Encoding errors
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Opus encoder init failed: {0}")]
    Init(String),

    #[error("Opus encoding failed: {0}")]
    Encode(String),

    #[error("Resampler failed: {0}")]
    Resample(String),
}

/// Frame-buffering Opus encoder for mono f32 PCM at 48kHz
pub struct OpusEncoder {
    encoder: opus::Encoder,
    pending: Vec<f32>,
}

impl OpusEncoder {
    /// Create an encoder with the given target bitrate (bits/s)
    pub fn new(bitrate: u32) -> Result<Self, EncodingError> {
        let mut encoder =
            opus::Encoder::new(OPUS_SAMPLE_RATE, opus::Channels::Mono, opus::Application::Audio)
                .map_err(|e| EncodingError::Init(e.to_string()))?;

        let bitrate = i32::try_from(bitrate).unwrap_or(i32::MAX);
        encoder
            .set_bitrate(opus::Bitrate::Bits(bitrate))
            .map_err(|e| EncodingError::Init(e.to_string()))?;
        encoder
            .set_vbr(true)
            .map_err(|e| EncodingError::Init(e.to_string()))?;

        Ok(Self {
            encoder,
            pending: Vec::with_capacity(FRAME_SIZE * 2),
        })
    }

    /// Buffer samples and encode every complete frame
    pub fn push(&mut self, samples: &[f32]) -> Result<Vec<Vec<u8>>, EncodingError> {
        self.pending.extend_from_slice(samples);

        let full = self.pending.len() / FRAME_SIZE * FRAME_SIZE;
        let mut packets = Vec::with_capacity(full / FRAME_SIZE);
        for frame in self.pending[..full].chunks_exact(FRAME_SIZE) {
            packets.push(Self::encode_frame(&mut self.encoder, frame)?);
        }
        self.pending.drain(..full);

        Ok(packets)
    }

    /// Encode the partial frame left in the buffer, zero-padded
    pub fn flush(&mut self) -> Result<Option<Vec<u8>>, EncodingError> {
        if self.pending.is_empty() {
            return Ok(None);
        }

        let mut frame = std::mem::take(&mut self.pending);
        frame.resize(FRAME_SIZE, 0.0);
        Self::encode_frame(&mut self.encoder, &frame).map(Some)
    }

    fn encode_frame(encoder: &mut opus::Encoder, frame: &[f32]) -> Result<Vec<u8>, EncodingError> {
        let mut packet = vec![0u8; MAX_PACKET_SIZE];
        let len = encoder
            .encode_float(frame, &mut packet)
            .map_err(|e| EncodingError::Encode(e.to_string()))?;
        packet.truncate(len);
        Ok(packet)
    }
}

/// Opus identification header, used as the track's codec private data
pub fn opus_head(input_sample_rate: u32) -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead"); // Magic signature
    head.push(1); // Version
    head.push(1); // Channel count (mono)
    head.extend_from_slice(&PRE_SKIP.to_le_bytes());
    head.extend_from_slice(&input_sample_rate.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes()); // Output gain
    head.push(0); // Channel mapping family
    head
}
