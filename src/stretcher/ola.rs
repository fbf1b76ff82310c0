//! Windowed overlap-add time stretching.
//!
//! Grains of `frame_size` samples are read from the input every
//! `hop / time_ratio` samples, Hann-windowed and summed into the output every
//! `hop` samples. With a periodic Hann window and 50% synthesis overlap the
//! windows sum to one, so no normalization pass is needed.

use std::collections::VecDeque;
use std::f64::consts::PI;

use super::{StretcherSpec, TimeStretcher};

pub const DEFAULT_FRAME_SIZE: usize = 1024;

const MIN_TIME_RATIO: f64 = 0.1;
const MAX_TIME_RATIO: f64 = 10.0;

/// Periodic Hann window of `size` samples.
fn hann_window(size: usize) -> Vec<f32> {
    let n = size as f64;
    (0..size)
        .map(|i| (0.5 * (1.0 - (2.0 * PI * i as f64 / n).cos())) as f32)
        .collect()
}

#[derive(Debug)]
pub struct OlaStretcher {
    frame_size: usize,
    hop: usize,
    window: Vec<f32>,
    time_ratio: f64,
    /// Unconsumed input per channel
    input: Vec<Vec<f32>>,
    /// Position of the next grain within `input`
    analysis_pos: f64,
    overlap: Vec<Vec<f32>>,
    ready: Vec<VecDeque<f32>>,
    finished: bool,
}

impl OlaStretcher {
    pub fn new(spec: StretcherSpec) -> Self {
        Self::with_frame_size(spec, DEFAULT_FRAME_SIZE)
    }

    /// `frame_size` is rounded down to an even number of at least 2.
    pub fn with_frame_size(spec: StretcherSpec, frame_size: usize) -> Self {
        let frame_size = frame_size.max(2) & !1;
        Self {
            frame_size,
            hop: frame_size / 2,
            window: hann_window(frame_size),
            time_ratio: 1.0,
            input: vec![Vec::new(); spec.channels],
            analysis_pos: 0.0,
            overlap: vec![vec![0.0; frame_size]; spec.channels],
            ready: vec![VecDeque::new(); spec.channels],
            finished: false,
        }
    }

    pub fn time_ratio(&self) -> f64 {
        self.time_ratio
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Frames ready to be retrieved
    pub fn available(&self) -> usize {
        self.ready.first().map_or(0, VecDeque::len)
    }

    fn run_grains(&mut self) {
        let analysis_hop = self.hop as f64 / self.time_ratio;
        let available = self.input.first().map_or(0, Vec::len);

        loop {
            let start = self.analysis_pos.floor() as usize;
            if start + self.frame_size > available {
                break;
            }

            for ((input, overlap), ready) in self
                .input
                .iter()
                .zip(self.overlap.iter_mut())
                .zip(self.ready.iter_mut())
            {
                let grain = &input[start..start + self.frame_size];
                for ((acc, sample), w) in overlap.iter_mut().zip(grain).zip(&self.window) {
                    *acc += sample * w;
                }

                ready.extend(overlap.drain(..self.hop));
                overlap.resize(self.frame_size, 0.0);
            }

            self.analysis_pos += analysis_hop;
        }

        let consumed = (self.analysis_pos.floor() as usize).min(available);
        if consumed > 0 {
            for input in &mut self.input {
                input.drain(..consumed);
            }
            self.analysis_pos -= consumed as f64;
        }
    }
}

impl TimeStretcher for OlaStretcher {
    fn set_time_ratio(&mut self, ratio: f64) {
        if !ratio.is_finite() || ratio <= 0.0 {
            warn!("Ignoring invalid time ratio {ratio}, keeping {}", self.time_ratio);
            return;
        }

        let clamped = ratio.clamp(MIN_TIME_RATIO, MAX_TIME_RATIO);
        if clamped != ratio {
            debug!("Time ratio {ratio} out of range, using {clamped}");
        }
        self.time_ratio = clamped;
    }

    fn process(&mut self, input: &[Vec<f32>], frames: usize, is_final: bool) {
        if self.finished {
            return;
        }

        for (pending, block) in self.input.iter_mut().zip(input) {
            pending.extend_from_slice(&block[..frames]);
        }

        if is_final {
            // Pad so the last real samples still get a full grain
            for pending in &mut self.input {
                pending.resize(pending.len() + self.frame_size, 0.0);
            }
        }

        self.run_grains();

        if is_final {
            for (overlap, ready) in self.overlap.iter_mut().zip(self.ready.iter_mut()) {
                ready.extend(overlap.drain(..self.hop));
                overlap.clear();
            }
            self.finished = true;
        }
    }

    fn retrieve(&mut self, output: &mut [Vec<f32>], max_frames: usize) -> usize {
        let capacity = output.first().map_or(0, Vec::len);
        let frames = self.available().min(max_frames).min(capacity);

        for (ready, block) in self.ready.iter_mut().zip(output.iter_mut()) {
            for (out, sample) in block.iter_mut().zip(ready.drain(..frames)) {
                *out = sample;
            }
        }

        frames
    }
}
