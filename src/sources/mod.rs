//! Byte-oriented PCM sources.
//!
//! All sources implement the `PcmSource` trait, a pull-based interface that
//! hands out raw interleaved little-endian bytes in whatever chunk sizes are
//! convenient for the source.

pub mod reader;
pub mod sine;
pub mod wav;

pub use reader::ReaderSource;
pub use sine::SineSource;
pub use wav::WavSource;

use crate::constants::{BITS_PER_SAMPLE, BYTES_PER_SAMPLE};
use crate::error::{Result, StreamError};

/// Layout of the bytes a source produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl StreamFormat {
    /// 16-bit format with the given rate and channel count.
    pub fn pcm16(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample: BITS_PER_SAMPLE,
        }
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * BYTES_PER_SAMPLE
    }

    /// Check that the pull loop can handle this format.
    pub fn validate(&self) -> Result<()> {
        if self.bits_per_sample != BITS_PER_SAMPLE {
            return Err(StreamError::UnsupportedBitDepth(self.bits_per_sample));
        }
        if self.channels == 0 {
            return Err(StreamError::NoChannels);
        }
        Ok(())
    }
}

/// Trait for sources that produce PCM bytes on demand.
pub trait PcmSource {
    fn format(&self) -> StreamFormat;

    /// Read up to `buffer.len()` bytes into `buffer`.
    ///
    /// Returns:
    /// - `Ok(n)` with `n > 0` bytes written, not necessarily frame-aligned
    /// - `Ok(0)` once the source is exhausted
    ///
    /// Must not block indefinitely.
    fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize>;
}

impl<S: PcmSource + ?Sized> PcmSource for Box<S> {
    fn format(&self) -> StreamFormat {
        (**self).format()
    }

    fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
        (**self).read(buffer)
    }
}
