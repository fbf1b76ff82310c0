use std::collections::VecDeque;

use super::{StretcherSpec, TimeStretcher};

/// Identity engine: frames come out exactly as they went in.
///
/// The time ratio is recorded but has no effect. An optional latency holds
/// back the newest frames until more input arrives or the input is marked
/// final, which mimics the internal buffering of a real engine.
#[derive(Debug)]
pub struct PassthroughStretcher {
    queues: Vec<VecDeque<f32>>,
    latency_frames: usize,
    time_ratio: f64,
    finished: bool,
}

impl PassthroughStretcher {
    pub fn new(spec: StretcherSpec) -> Self {
        Self::with_latency(spec, 0)
    }

    pub fn with_latency(spec: StretcherSpec, latency_frames: usize) -> Self {
        Self {
            queues: vec![VecDeque::new(); spec.channels],
            latency_frames,
            time_ratio: 1.0,
            finished: false,
        }
    }

    pub fn time_ratio(&self) -> f64 {
        self.time_ratio
    }

    /// Frames held back by the latency window
    pub fn buffered_frames(&self) -> usize {
        self.queues.first().map_or(0, VecDeque::len)
    }

    fn ready_frames(&self) -> usize {
        let buffered = self.buffered_frames();
        if self.finished {
            buffered
        } else {
            buffered.saturating_sub(self.latency_frames)
        }
    }
}

impl TimeStretcher for PassthroughStretcher {
    fn set_time_ratio(&mut self, ratio: f64) {
        self.time_ratio = ratio;
    }

    fn process(&mut self, input: &[Vec<f32>], frames: usize, is_final: bool) {
        for (queue, block) in self.queues.iter_mut().zip(input) {
            queue.extend(&block[..frames]);
        }
        if is_final {
            self.finished = true;
        }
    }

    fn retrieve(&mut self, output: &mut [Vec<f32>], max_frames: usize) -> usize {
        let capacity = output.first().map_or(0, Vec::len);
        let frames = self.ready_frames().min(max_frames).min(capacity);

        for (queue, block) in self.queues.iter_mut().zip(output.iter_mut()) {
            for (out, sample) in block.iter_mut().zip(queue.drain(..frames)) {
                *out = sample;
            }
        }

        frames
    }
}
