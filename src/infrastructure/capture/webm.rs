//! Minimal WebM (Matroska) muxer for a single Opus track
//!
//! Output layout:
//! - header chunk: EBML header, Segment of unknown size, Info, Tracks
//! - one Cluster per timeslice, each holding SimpleBlocks of 20 ms Opus frames
//!
//! Concatenating the header with every cluster yields a playable file.
//! No Cues or SeekHead are written, so players fall back to linear seeking.

/// Track number of the only track
const TRACK_NUMBER: u64 = 1;

/// One millisecond per timecode tick
const TIMECODE_SCALE_NS: u64 = 1_000_000;

/// Seek pre-roll recommended for Opus (80 ms)
const OPUS_SEEK_PRE_ROLL_NS: u64 = 80_000_000;

/// "Unknown" size marker for the live Segment element
const UNKNOWN_SIZE: [u8; 8] = [0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

mod id {
    pub const EBML: u32 = 0x1A45_DFA3;
    pub const EBML_VERSION: u32 = 0x4286;
    pub const EBML_READ_VERSION: u32 = 0x42F7;
    pub const EBML_MAX_ID_LENGTH: u32 = 0x42F2;
    pub const EBML_MAX_SIZE_LENGTH: u32 = 0x42F3;
    pub const DOC_TYPE: u32 = 0x4282;
    pub const DOC_TYPE_VERSION: u32 = 0x4287;
    pub const DOC_TYPE_READ_VERSION: u32 = 0x4285;

    pub const SEGMENT: u32 = 0x1853_8067;

    pub const INFO: u32 = 0x1549_A966;
    pub const TIMECODE_SCALE: u32 = 0x2A_D7B1;
    pub const MUXING_APP: u32 = 0x4D80;
    pub const WRITING_APP: u32 = 0x5741;

    pub const TRACKS: u32 = 0x1654_AE6B;
    pub const TRACK_ENTRY: u32 = 0xAE;
    pub const TRACK_NUMBER: u32 = 0xD7;
    pub const TRACK_UID: u32 = 0x73C5;
    pub const TRACK_TYPE: u32 = 0x83;
    pub const CODEC_ID: u32 = 0x86;
    pub const CODEC_PRIVATE: u32 = 0x63A2;
    pub const CODEC_DELAY: u32 = 0x56AA;
    pub const SEEK_PRE_ROLL: u32 = 0x56BB;
    pub const AUDIO: u32 = 0xE1;
    pub const SAMPLING_FREQUENCY: u32 = 0xB5;
    pub const CHANNELS: u32 = 0x9F;

    pub const CLUSTER: u32 = 0x1F43_B675;
    pub const TIMECODE: u32 = 0xE7;
    pub const SIMPLE_BLOCK: u32 = 0xA3;
}

/// Stream parameters written into the Tracks element
#[derive(Debug, Clone)]
pub struct TrackParams {
    pub sample_rate: u32,
    pub channels: u8,
    /// Encoder delay in samples at `sample_rate`
    pub pre_skip: u16,
    /// `OpusHead` identification header
    pub codec_private: Vec<u8>,
}

/// Build the header chunk
pub fn header(track: &TrackParams) -> Vec<u8> {
    let mut ebml = Vec::new();
    uint_element(&mut ebml, id::EBML_VERSION, 1);
    uint_element(&mut ebml, id::EBML_READ_VERSION, 1);
    uint_element(&mut ebml, id::EBML_MAX_ID_LENGTH, 4);
    uint_element(&mut ebml, id::EBML_MAX_SIZE_LENGTH, 8);
    string_element(&mut ebml, id::DOC_TYPE, "webm");
    uint_element(&mut ebml, id::DOC_TYPE_VERSION, 4);
    uint_element(&mut ebml, id::DOC_TYPE_READ_VERSION, 2);

    let mut info = Vec::new();
    uint_element(&mut info, id::TIMECODE_SCALE, TIMECODE_SCALE_NS);
    string_element(&mut info, id::MUXING_APP, env!("CARGO_PKG_NAME"));
    string_element(&mut info, id::WRITING_APP, env!("CARGO_PKG_NAME"));

    let mut audio = Vec::new();
    float_element(&mut audio, id::SAMPLING_FREQUENCY, f64::from(track.sample_rate));
    uint_element(&mut audio, id::CHANNELS, u64::from(track.channels));

    let codec_delay_ns =
        u64::from(track.pre_skip) * 1_000_000_000 / u64::from(track.sample_rate.max(1));

    let mut entry = Vec::new();
    uint_element(&mut entry, id::TRACK_NUMBER, TRACK_NUMBER);
    uint_element(&mut entry, id::TRACK_UID, TRACK_NUMBER);
    uint_element(&mut entry, id::TRACK_TYPE, 2);
    string_element(&mut entry, id::CODEC_ID, "A_OPUS");
    element(&mut entry, id::CODEC_PRIVATE, &track.codec_private);
    uint_element(&mut entry, id::CODEC_DELAY, codec_delay_ns);
    uint_element(&mut entry, id::SEEK_PRE_ROLL, OPUS_SEEK_PRE_ROLL_NS);
    element(&mut entry, id::AUDIO, &audio);

    let mut tracks = Vec::new();
    element(&mut tracks, id::TRACK_ENTRY, &entry);

    let mut out = Vec::new();
    element(&mut out, id::EBML, &ebml);
    write_id(&mut out, id::SEGMENT);
    out.extend_from_slice(&UNKNOWN_SIZE);
    element(&mut out, id::INFO, &info);
    element(&mut out, id::TRACKS, &tracks);
    out
}

/// Groups fixed-length frames into one Cluster per timeslice
#[derive(Debug)]
pub struct ClusterWriter {
    timeslice_ms: u64,
    frame_ms: u64,
    frames: u64,
    cluster_start_ms: u64,
    blocks: Vec<u8>,
}

impl ClusterWriter {
    /// `timeslice_ms` must fit the 16-bit relative block timecode
    pub fn new(timeslice_ms: u64, frame_ms: u64) -> Self {
        Self {
            timeslice_ms: timeslice_ms.clamp(frame_ms.max(1), i16::MAX as u64),
            frame_ms,
            frames: 0,
            cluster_start_ms: 0,
            blocks: Vec::new(),
        }
    }

    /// Total frames written so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Append one frame.
    ///
    /// Returns a finished Cluster once the frames since the last one cover
    /// a full timeslice.
    pub fn push_frame(&mut self, packet: &[u8]) -> Option<Vec<u8>> {
        let timecode_ms = self.frames * self.frame_ms;
        let relative = (timecode_ms - self.cluster_start_ms) as i16;
        simple_block(&mut self.blocks, relative, packet);
        self.frames += 1;

        let end_ms = self.frames * self.frame_ms;
        if end_ms - self.cluster_start_ms >= self.timeslice_ms {
            let cluster = self.take_cluster();
            self.cluster_start_ms = end_ms;
            Some(cluster)
        } else {
            None
        }
    }

    /// Close the open Cluster, if it holds any frames
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.blocks.is_empty() {
            None
        } else {
            Some(self.take_cluster())
        }
    }

    fn take_cluster(&mut self) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.blocks.len() + 16);
        uint_element(&mut body, id::TIMECODE, self.cluster_start_ms);
        body.append(&mut self.blocks);

        let mut out = Vec::with_capacity(body.len() + 12);
        element(&mut out, id::CLUSTER, &body);
        out
    }
}

fn simple_block(out: &mut Vec<u8>, relative_timecode: i16, packet: &[u8]) {
    let mut body = Vec::with_capacity(packet.len() + 4);
    body.push(0x80 | TRACK_NUMBER as u8);
    body.extend_from_slice(&relative_timecode.to_be_bytes());
    // keyframe
    body.push(0x80);
    body.extend_from_slice(packet);
    element(out, id::SIMPLE_BLOCK, &body);
}

fn element(out: &mut Vec<u8>, id: u32, body: &[u8]) {
    write_id(out, id);
    write_size(out, body.len() as u64);
    out.extend_from_slice(body);
}

fn uint_element(out: &mut Vec<u8>, id: u32, value: u64) {
    let bytes = value.to_be_bytes();
    let skip = (value.leading_zeros() / 8).min(7) as usize;
    element(out, id, &bytes[skip..]);
}

fn float_element(out: &mut Vec<u8>, id: u32, value: f64) {
    element(out, id, &value.to_be_bytes());
}

fn string_element(out: &mut Vec<u8>, id: u32, value: &str) {
    element(out, id, value.as_bytes());
}

/// IDs carry their own length marker, so only leading zero bytes are dropped
fn write_id(out: &mut Vec<u8>, id: u32) {
    let bytes = id.to_be_bytes();
    let skip = (id.leading_zeros() / 8).min(3) as usize;
    out.extend_from_slice(&bytes[skip..]);
}

/// Shortest variable-length size; the all-ones pattern is reserved for "unknown"
fn write_size(out: &mut Vec<u8>, size: u64) {
    let mut len = 1;
    while len < 8 && size >= (1u64 << (7 * len)) - 1 {
        len += 1;
    }
    let marked = size | (1u64 << (7 * len));
    out.extend_from_slice(&marked.to_be_bytes()[8 - len..]);
}
