//! Read-driven adapter between a PCM byte source and a time stretcher.
//!
//! Callers pull an exact number of bytes; `TempoStream` pulls source bytes,
//! feeds the stretcher in whole frames and converts whatever it hands back.
//! Leftovers on both sides are staged in [`crate::buffer`].

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::buffer::{InputLeftover, OutputLeftover};
use crate::codec;
use crate::constants::DEFAULT_BLOCK_FRAMES;
use crate::error::{Result, StreamError};
use crate::event::{NoopObserver, StreamObserver};
use crate::sources::{PcmSource, StreamFormat};
use crate::stretcher::{StretcherSpec, TimeStretcher};
use crate::tempo::{is_valid_tempo, TempoHandle, TempoState};

/// What happens to audio still buffered inside the stretcher when the
/// source runs dry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TailPolicy {
    /// Mark the input final and deliver everything the stretcher still holds
    #[default]
    Flush,
    /// Stop at the first empty source read; buffered frames are lost
    Discard,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Frames per block exchanged with the stretcher
    pub block_frames: usize,
    /// Playback speed, 1.0 is unchanged
    pub tempo: f64,
    pub tail: TailPolicy,
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            block_frames: DEFAULT_BLOCK_FRAMES,
            tempo: 1.0,
            tail: TailPolicy::default(),
        }
    }
}

/// Byte counters since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Bytes pulled from the source
    pub source_bytes: u64,
    /// Stretcher output delivered to callers
    pub delivered_bytes: u64,
    /// Silence delivered after end of stream
    pub padding_bytes: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Streaming,
    /// Source is dry and the stretcher was told so; emptying its tail
    Draining,
    Exhausted,
}

enum Pull {
    Fed,
    Exhausted,
}

pub struct TempoStream<S, T> {
    source: S,
    stretcher: T,
    observer: Box<dyn StreamObserver>,
    format: StreamFormat,
    bytes_per_frame: usize,
    block_frames: usize,

    scratch: Vec<u8>,
    input_blocks: Vec<Vec<f32>>,
    output_blocks: Vec<Vec<f32>>,
    input_leftover: InputLeftover,
    output_leftover: OutputLeftover,

    tempo: TempoState,
    tempo_handle: TempoHandle,
    tail: TailPolicy,
    phase: Phase,
    stats: StreamStats,
}

impl<S: PcmSource, T: TimeStretcher> TempoStream<S, T> {
    /// Wrap `source`, building the stretcher from the source's format.
    ///
    /// Fails if the source is not 16-bit PCM, has no channels, or the
    /// options are out of range.
    pub fn new<F>(source: S, make_stretcher: F, options: StreamOptions) -> Result<Self>
    where
        F: FnOnce(StretcherSpec) -> T,
    {
        let format = source.format();
        format.validate()?;

        if options.block_frames == 0 {
            return Err(StreamError::InvalidBlockSize);
        }
        if !is_valid_tempo(options.tempo) {
            return Err(StreamError::InvalidTempo(options.tempo));
        }

        let channels = format.channels as usize;
        let bytes_per_frame = format.bytes_per_frame();
        let block_bytes = options.block_frames * bytes_per_frame;

        let stretcher = make_stretcher(StretcherSpec {
            sample_rate: format.sample_rate,
            channels,
            realtime: true,
        });

        debug!(
            "Created tempo stream: {} Hz, {} channels, {} frames per block, tempo {}",
            format.sample_rate, format.channels, options.block_frames, options.tempo
        );

        Ok(Self {
            source,
            stretcher,
            observer: Box::new(NoopObserver),
            format,
            bytes_per_frame,
            block_frames: options.block_frames,
            scratch: vec![0; block_bytes],
            input_blocks: vec![vec![0.0; options.block_frames]; channels],
            output_blocks: vec![vec![0.0; options.block_frames]; channels],
            input_leftover: InputLeftover::new(bytes_per_frame),
            output_leftover: OutputLeftover::with_capacity(block_bytes),
            tempo: TempoState::new(options.tempo),
            tempo_handle: TempoHandle::new(),
            tail: options.tail,
            phase: Phase::Streaming,
            stats: StreamStats::default(),
        })
    }

    pub fn with_observer<O: StreamObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Fill `buffer` completely.
    ///
    /// Always returns `buffer.len()`. Once the source and the stretcher tail
    /// are exhausted the remainder is zero-filled, and every later call
    /// returns silence.
    pub fn fill(&mut self, buffer: &mut [u8]) -> usize {
        let count = buffer.len();
        if count == 0 {
            return 0;
        }

        let mut written = self.output_leftover.drain_into(buffer);
        self.stats.delivered_bytes += written as u64;

        while written < count {
            if self.phase == Phase::Exhausted {
                self.pad(&mut buffer[written..]);
                break;
            }

            let remaining = count - written;
            let frames_wanted = remaining
                .div_ceil(self.bytes_per_frame)
                .min(self.block_frames);

            self.apply_pending_tempo();

            let frames = self
                .stretcher
                .retrieve(&mut self.output_blocks, frames_wanted)
                .min(self.block_frames);

            if frames == 0 {
                if let Pull::Exhausted = self.pull() {
                    self.finish();
                }
                continue;
            }

            written += self.deliver(frames, &mut buffer[written..]);
        }

        count
    }

    /// Fill `buffer[offset..offset + count]`, returning `count`.
    ///
    /// Panics if the range lies outside `buffer`.
    pub fn read_into(&mut self, buffer: &mut [u8], offset: usize, count: usize) -> usize {
        self.fill(&mut buffer[offset..offset + count])
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Tempo last set on the stream or picked up from the handle, whether
    /// or not the stretcher has been given it yet.
    pub fn tempo(&self) -> f64 {
        self.tempo.tempo()
    }

    /// Stage a tempo change for the next processing iteration.
    ///
    /// Values that are not positive and finite are ignored.
    pub fn set_tempo(&mut self, tempo: f64) {
        if !self.tempo.set(tempo) {
            warn!("Ignoring invalid tempo {tempo}");
        }
    }

    /// Handle for changing the tempo from another thread.
    pub fn tempo_handle(&self) -> TempoHandle {
        self.tempo_handle.clone()
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn block_frames(&self) -> usize {
        self.block_frames
    }

    /// Whether end of stream has been reached and reads only return silence.
    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn stretcher(&self) -> &T {
        &self.stretcher
    }

    pub fn into_inner(self) -> (S, T) {
        (self.source, self.stretcher)
    }

    fn apply_pending_tempo(&mut self) {
        if let Some(tempo) = self.tempo_handle.take() {
            self.set_tempo(tempo);
        }

        if let Some(ratio) = self.tempo.take_pending_ratio() {
            debug!("Applying tempo {} (time ratio {ratio})", self.tempo.tempo());
            self.stretcher.set_time_ratio(ratio);
        }
    }

    /// Pull one chunk from the source and feed its complete frames to the
    /// stretcher.
    fn pull(&mut self) -> Pull {
        if self.phase != Phase::Streaming {
            return Pull::Exhausted;
        }

        let staged = self.input_leftover.take_into(&mut self.scratch);
        let bytes_read = match self.source.read(&mut self.scratch[staged..]) {
            Ok(bytes_read) => bytes_read,
            Err(e) => {
                warn!("Source read failed, treating as end of stream: {e}");
                0
            }
        };

        if bytes_read == 0 {
            if staged > 0 {
                debug!("Dropping {staged} bytes of an incomplete frame at end of stream");
            }
            return self.begin_tail();
        }

        self.stats.source_bytes += bytes_read as u64;
        self.observer.source_read(bytes_read);
        trace!("Pulled {bytes_read} bytes from source ({staged} staged)");

        let total = staged + bytes_read;
        let frames = total / self.bytes_per_frame;
        let used = frames * self.bytes_per_frame;
        self.input_leftover.stash(&self.scratch[used..total]);

        if frames > 0 {
            codec::decode_frames(&self.scratch[..used], &mut self.input_blocks, frames);
            self.stretcher.process(&self.input_blocks, frames, false);
        }

        Pull::Fed
    }

    fn begin_tail(&mut self) -> Pull {
        match self.tail {
            TailPolicy::Flush => {
                debug!("Source exhausted, flushing stretcher tail");
                self.stretcher.process(&self.input_blocks, 0, true);
                self.phase = Phase::Draining;
                Pull::Fed
            }
            TailPolicy::Discard => Pull::Exhausted,
        }
    }

    fn finish(&mut self) {
        if self.phase != Phase::Exhausted {
            self.phase = Phase::Exhausted;
            debug!("End of stream reached");
            self.observer.end_of_stream();
        }
    }

    /// Encode `frames` retrieved frames into `out`, staging what does not fit.
    fn deliver(&mut self, frames: usize, out: &mut [u8]) -> usize {
        let mut written = 0;
        let output_leftover = &mut self.output_leftover;

        codec::encode_frames(&self.output_blocks, frames, |byte| {
            if written < out.len() {
                out[written] = byte;
                written += 1;
            } else {
                output_leftover.push(byte);
            }
        });

        self.stats.delivered_bytes += written as u64;
        written
    }

    fn pad(&mut self, out: &mut [u8]) {
        out.fill(0);
        self.stats.padding_bytes += out.len() as u64;
    }
}

/// Never returns an error or a short read; see [`TempoStream::fill`].
impl<S: PcmSource, T: TimeStretcher> Read for TempoStream<S, T> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Ok(self.fill(buf))
    }
}
