//! Construction errors for [`TempoStream`](crate::stream::TempoStream).
//!
//! Everything that can go wrong after construction (short source reads,
//! end-of-stream, sample overshoot) is absorbed by the stream itself.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    #[error("unsupported bit depth {0}, only 16-bit PCM is supported")]
    UnsupportedBitDepth(u16),

    #[error("source reports zero channels")]
    NoChannels,

    #[error("block size must hold at least one frame")]
    InvalidBlockSize,

    #[error("tempo must be a positive finite number, got {0}")]
    InvalidTempo(f64),
}

pub type Result<T> = std::result::Result<T, StreamError>;
