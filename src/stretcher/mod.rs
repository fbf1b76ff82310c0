//! Time-stretching engine abstraction.
//!
//! The pull loop only ever talks to a stretcher through [`TimeStretcher`],
//! handing it de-interleaved `f32` blocks and asking for whatever output it
//! has ready. Engines may buffer internally and return nothing for a while.

pub mod ola;
pub mod passthrough;

pub use ola::OlaStretcher;
pub use passthrough::PassthroughStretcher;

/// Parameters a stretcher is constructed with, derived from the source format.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StretcherSpec {
    pub sample_rate: u32,
    pub channels: usize,
    /// Whether the engine is driven live, in small blocks.
    pub realtime: bool,
}

pub trait TimeStretcher {
    /// Set the time ratio: output duration divided by input duration.
    fn set_time_ratio(&mut self, ratio: f64);

    /// Feed `frames` frames from `input`, one block per channel.
    ///
    /// `is_final` marks the end of the input; the engine should then make
    /// all of its buffered output retrievable.
    fn process(&mut self, input: &[Vec<f32>], frames: usize, is_final: bool);

    /// Write up to `max_frames` frames into `output`, returning the number
    /// written. Zero means nothing is ready yet.
    fn retrieve(&mut self, output: &mut [Vec<f32>], max_frames: usize) -> usize;
}

impl<T: TimeStretcher + ?Sized> TimeStretcher for Box<T> {
    fn set_time_ratio(&mut self, ratio: f64) {
        (**self).set_time_ratio(ratio)
    }

    fn process(&mut self, input: &[Vec<f32>], frames: usize, is_final: bool) {
        (**self).process(input, frames, is_final)
    }

    fn retrieve(&mut self, output: &mut [Vec<f32>], max_frames: usize) -> usize {
        (**self).retrieve(output, max_frames)
    }
}
