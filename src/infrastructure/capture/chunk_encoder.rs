//! Time-sliced WebM/Opus chunk encoder
//!
//! Turns mono PCM at the device rate into the chunk sequence delivered to the
//! pipeline: a header chunk first, then one Cluster per timeslice.

use crate::domain::capture::EncodedChunk;

use super::opus_encoder::{opus_head, EncodingError, OpusEncoder, FRAME_MS, OPUS_SAMPLE_RATE, PRE_SKIP};
use super::resampler::StreamResampler;
use super::webm::{self, ClusterWriter, TrackParams};

/// Encoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    pub input_rate: u32,
    pub bitrate: u32,
    pub timeslice_ms: u64,
}

/// Resampler + Opus + WebM clusters
pub struct ChunkEncoder {
    resampler: StreamResampler,
    opus: OpusEncoder,
    clusters: ClusterWriter,
    header: Vec<u8>,
}

impl ChunkEncoder {
    pub fn new(settings: EncoderSettings) -> Result<Self, EncodingError> {
        let header = webm::header(&TrackParams {
            sample_rate: OPUS_SAMPLE_RATE,
            channels: 1,
            pre_skip: PRE_SKIP,
            codec_private: opus_head(settings.input_rate),
        });

        Ok(Self {
            resampler: StreamResampler::new(settings.input_rate)?,
            opus: OpusEncoder::new(settings.bitrate)?,
            clusters: ClusterWriter::new(settings.timeslice_ms, FRAME_MS),
            header,
        })
    }

    /// The header chunk, emitted before any cluster
    pub fn header(&self) -> EncodedChunk {
        EncodedChunk::new(self.header.clone())
    }

    /// Encode device samples; returns the clusters completed by them
    pub fn encode(&mut self, samples: &[f32]) -> Result<Vec<EncodedChunk>, EncodingError> {
        let resampled = self.resampler.process(samples)?;
        let packets = self.opus.push(&resampled)?;
        Ok(self.mux(packets))
    }

    /// Flush buffered audio and close the last cluster
    pub fn finish(&mut self) -> Result<Vec<EncodedChunk>, EncodingError> {
        let tail = self.resampler.flush()?;
        let mut packets = self.opus.push(&tail)?;
        packets.extend(self.opus.flush()?);

        let mut chunks = self.mux(packets);
        chunks.extend(self.clusters.finish().map(EncodedChunk::new));
        Ok(chunks)
    }

    fn mux(&mut self, packets: Vec<Vec<u8>>) -> Vec<EncodedChunk> {
        packets
            .iter()
            .filter_map(|packet| self.clusters.push_frame(packet))
            .map(EncodedChunk::new)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::capture::opus_encoder::FRAME_SIZE;

    fn settings(input_rate: u32) -> EncoderSettings {
        EncoderSettings {
            input_rate,
            bitrate: 48_000,
            timeslice_ms: 1000,
        }
    }

    fn tone(len: usize, rate: u32) -> Vec<f32> {
        (0..len)
            .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn header_chunk_is_ebml() {
        let encoder = ChunkEncoder::new(settings(48_000)).unwrap();
        assert!(encoder
            .header()
            .as_bytes()
            .starts_with(&[0x1A, 0x45, 0xDF, 0xA3]));
    }

    #[test]
    fn one_cluster_per_timeslice() {
        let mut encoder = ChunkEncoder::new(settings(48_000)).unwrap();

        // 2.5 seconds, fed in callback-sized pieces
        let audio = tone(FRAME_SIZE * 125, 48_000);
        let mut clusters = Vec::new();
        for piece in audio.chunks(480) {
            clusters.extend(encoder.encode(piece).unwrap());
        }
        assert_eq!(clusters.len(), 2);

        let tail = encoder.finish().unwrap();
        assert_eq!(tail.len(), 1);
        assert!(clusters
            .iter()
            .chain(tail.iter())
            .all(|c| c.as_bytes().starts_with(&[0x1F, 0x43, 0xB6, 0x75])));
    }

    #[test]
    fn finish_without_audio_emits_nothing() {
        let mut encoder = ChunkEncoder::new(settings(48_000)).unwrap();
        assert!(encoder.finish().unwrap().is_empty());
    }

    #[test]
    fn resampled_input_produces_clusters() {
        let mut encoder = ChunkEncoder::new(settings(44_100)).unwrap();

        let audio = tone(44_100 * 3, 44_100);
        let mut chunks = Vec::new();
        for piece in audio.chunks(441) {
            chunks.extend(encoder.encode(piece).unwrap());
        }
        chunks.extend(encoder.finish().unwrap());

        assert!(chunks.len() >= 3, "got {} chunks", chunks.len());
    }
}
