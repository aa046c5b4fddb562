//! Capture infrastructure module
//!
//! Microphone capture through cpal, encoded to Opus and muxed into WebM
//! chunks: one header chunk, then one Cluster per timeslice.

mod chunk_encoder;
mod cpal_capture;
mod opus_encoder;
mod resampler;
mod webm;

pub use chunk_encoder::{ChunkEncoder, EncoderSettings};
pub use cpal_capture::CpalCapture;
pub use opus_encoder::{EncodingError, OPUS_SAMPLE_RATE};
