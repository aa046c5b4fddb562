//! Capture session entity

use crate::domain::recording::RecordingBlob;

use super::device::DeviceId;

/// One piece of encoded container data emitted by the encoder.
///
/// Chunks are only meaningful in order: the first carries the container
/// header, every later one a slice of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChunk(Vec<u8>);

impl EncodedChunk {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single start-to-stop recording cycle.
#[derive(Debug)]
pub struct CaptureSession {
    device: DeviceId,
    started_at_ms: u64,
    chunks: Vec<EncodedChunk>,
}

impl CaptureSession {
    /// Begin a session on `device` at `started_at_ms` (ms since epoch)
    pub fn begin(device: DeviceId, started_at_ms: u64) -> Self {
        Self {
            device,
            started_at_ms,
            chunks: Vec::new(),
        }
    }

    pub fn device(&self) -> &DeviceId {
        &self.device
    }

    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    /// Append a chunk; empty chunks are dropped
    pub fn push(&mut self, chunk: EncodedChunk) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total buffered bytes
    pub fn buffered_bytes(&self) -> usize {
        self.chunks.iter().map(EncodedChunk::len).sum()
    }

    /// Milliseconds since the session began, given the current time
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_at_ms)
    }

    /// Concatenate all chunks into one blob and reset the chunk buffer
    pub fn drain_into_blob(&mut self) -> RecordingBlob {
        let chunks = std::mem::take(&mut self.chunks);
        let mut data = Vec::with_capacity(chunks.iter().map(EncodedChunk::len).sum());
        for chunk in chunks {
            data.extend_from_slice(chunk.as_bytes());
        }
        RecordingBlob::webm(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CaptureSession {
        CaptureSession::begin(DeviceId::new("mic"), 1_000)
    }

    #[test]
    fn chunks_are_concatenated_in_order() {
        let mut s = session();
        s.push(EncodedChunk::new(vec![1, 2]));
        s.push(EncodedChunk::new(vec![3]));
        s.push(EncodedChunk::new(vec![4, 5, 6]));
        assert_eq!(s.chunk_count(), 3);
        assert_eq!(s.buffered_bytes(), 6);

        let blob = s.drain_into_blob();
        assert_eq!(blob.data(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn drain_resets_buffer() {
        let mut s = session();
        s.push(EncodedChunk::new(vec![9; 10]));
        let _ = s.drain_into_blob();
        assert_eq!(s.chunk_count(), 0);
        assert!(s.drain_into_blob().is_empty());
    }

    #[test]
    fn zero_chunks_yield_empty_blob() {
        let mut s = session();
        let blob = s.drain_into_blob();
        assert!(blob.is_empty());
    }

    #[test]
    fn empty_chunks_are_ignored() {
        let mut s = session();
        s.push(EncodedChunk::new(Vec::new()));
        assert_eq!(s.chunk_count(), 0);
    }

    #[test]
    fn elapsed_saturates() {
        let s = session();
        assert_eq!(s.elapsed_ms(1_250), 250);
        assert_eq!(s.elapsed_ms(500), 0);
    }
}
