//! Test infrastructure for pcm-tempo-rs integration tests.
//!
//! Provides scripted sources, a call-recording stretcher and helpers for
//! driving a stream with arbitrary request sizes.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

pub use pcm_tempo_rs::stretcher::{PassthroughStretcher, StretcherSpec, TimeStretcher};
pub use pcm_tempo_rs::{
    EventBus, PcmSource, StreamError, StreamEvent, StreamFormat, StreamOptions, TailPolicy,
    TempoStream,
};

pub const SAMPLE_RATE: u32 = 44100;

/// Interleaved PCM bytes where every sample has a distinct, recognizable value.
pub fn ramp_pcm(frames: usize, channels: u16) -> Vec<u8> {
    (0..frames * channels as usize)
        .flat_map(|i| (((i * 37) % 65536) as u16 as i16).to_le_bytes())
        .collect()
}

/// Source that hands out `data` in a fixed, repeating pattern of chunk sizes.
pub struct ChunkedSource {
    data: Vec<u8>,
    position: usize,
    format: StreamFormat,
    chunks: Vec<usize>,
    next_chunk: usize,
    pub reads: usize,
}

impl ChunkedSource {
    pub fn new(data: Vec<u8>, channels: u16, chunks: Vec<usize>) -> Self {
        assert!(!chunks.is_empty());
        Self {
            data,
            position: 0,
            format: StreamFormat::pcm16(SAMPLE_RATE, channels),
            chunks,
            next_chunk: 0,
            reads: 0,
        }
    }

    pub fn with_format(mut self, format: StreamFormat) -> Self {
        self.format = format;
        self
    }
}

impl PcmSource for ChunkedSource {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;

        let chunk = self.chunks[self.next_chunk % self.chunks.len()];
        self.next_chunk += 1;

        let remaining = self.data.len() - self.position;
        let count = chunk.min(buffer.len()).min(remaining);
        buffer[..count].copy_from_slice(&self.data[self.position..self.position + count]);
        self.position += count;

        Ok(count)
    }
}

/// Source that returns its data once and then fails.
pub struct FailingSource {
    data: Option<Vec<u8>>,
    format: StreamFormat,
}

impl FailingSource {
    pub fn new(data: Vec<u8>, channels: u16) -> Self {
        Self {
            data: Some(data),
            format: StreamFormat::pcm16(SAMPLE_RATE, channels),
        }
    }
}

impl PcmSource for FailingSource {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        match self.data.take() {
            Some(data) => {
                assert!(data.len() <= buffer.len());
                buffer[..data.len()].copy_from_slice(&data);
                Ok(data.len())
            }
            None => Err(io::Error::other("device unplugged")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    SetTimeRatio(f64),
    Process { frames: usize, is_final: bool },
    Retrieve { max_frames: usize, returned: usize },
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Passthrough engine that logs every call made to it.
pub struct RecordingStretcher {
    inner: PassthroughStretcher,
    calls: CallLog,
}

impl RecordingStretcher {
    pub fn new(spec: StretcherSpec, calls: CallLog) -> Self {
        Self {
            inner: PassthroughStretcher::new(spec),
            calls,
        }
    }
}

impl TimeStretcher for RecordingStretcher {
    fn set_time_ratio(&mut self, ratio: f64) {
        self.calls.lock().unwrap().push(Call::SetTimeRatio(ratio));
        self.inner.set_time_ratio(ratio);
    }

    fn process(&mut self, input: &[Vec<f32>], frames: usize, is_final: bool) {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Process { frames, is_final });
        self.inner.process(input, frames, is_final);
    }

    fn retrieve(&mut self, output: &mut [Vec<f32>], max_frames: usize) -> usize {
        let returned = self.inner.retrieve(output, max_frames);
        self.calls.lock().unwrap().push(Call::Retrieve {
            max_frames,
            returned,
        });
        returned
    }
}

pub fn options(block_frames: usize, tail: TailPolicy) -> StreamOptions {
    StreamOptions {
        block_frames,
        tempo: 1.0,
        tail,
    }
}

/// Stream over `data` delivered in `chunks`, with an identity stretcher.
pub fn passthrough_stream(
    data: Vec<u8>,
    channels: u16,
    chunks: Vec<usize>,
    block_frames: usize,
) -> TempoStream<ChunkedSource, PassthroughStretcher> {
    TempoStream::new(
        ChunkedSource::new(data, channels, chunks),
        PassthroughStretcher::new,
        options(block_frames, TailPolicy::Flush),
    )
    .unwrap_or_else(|e| panic!("could not build stream: {e}"))
}

/// Read from `stream` using each request size in turn, asserting every call
/// returns exactly what was asked for.
pub fn read_with_sizes<S, T, I>(stream: &mut TempoStream<S, T>, sizes: I) -> Vec<u8>
where
    S: PcmSource,
    T: TimeStretcher,
    I: IntoIterator<Item = usize>,
{
    let mut out = Vec::new();
    for size in sizes {
        let mut buf = vec![0xaau8; size];
        assert_eq!(stream.fill(&mut buf), size);
        out.extend_from_slice(&buf);
    }
    out
}

/// `data` followed by `total - data.len()` zero bytes.
pub fn padded(data: &[u8], total: usize) -> Vec<u8> {
    let mut expected = data.to_vec();
    expected.resize(total, 0);
    expected
}
