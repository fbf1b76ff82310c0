//! pcm-tempo-rs library crate
//!
//! Adapts a pull-based 16-bit PCM byte source to a block-based float
//! time stretcher, so callers can read tempo-adjusted PCM bytes in any
//! amount they like. The binary in main.rs wires this up to WAV files and
//! a TCP listener.

#[macro_use]
extern crate log;

pub mod buffer;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod render;
pub mod sources;
pub mod stream;
pub mod stretcher;
pub mod tempo;

pub use error::StreamError;
pub use event::{EventBus, StreamEvent, StreamObserver};
pub use sources::{PcmSource, StreamFormat};
pub use stream::{StreamOptions, StreamStats, TailPolicy, TempoStream};
pub use stretcher::{StretcherSpec, TimeStretcher};
pub use tempo::TempoHandle;
