use byteorder::{ByteOrder, LittleEndian};

use super::{PcmSource, StreamFormat};

const AMPLITUDE: f64 = 0.5; // 50% amplitude

/// Sine tone generator, the same signal on every channel.
#[derive(Debug)]
pub struct SineSource {
    format: StreamFormat,
    frequency: f64,
    phase: f64,
    /// `None` plays forever
    frames_left: Option<u64>,
    frame: Vec<u8>,
    frame_pos: usize,
}

impl SineSource {
    pub fn new(format: StreamFormat, frequency: f64, frames: Option<u64>) -> Self {
        let bytes_per_frame = format.bytes_per_frame();
        Self {
            format,
            frequency,
            phase: 0.0,
            frames_left: frames,
            frame: vec![0; bytes_per_frame],
            // Start "drained" so the first read generates a frame
            frame_pos: bytes_per_frame,
        }
    }

    /// A tone lasting `seconds`.
    pub fn with_duration(format: StreamFormat, frequency: f64, seconds: f64) -> Self {
        let frames = (seconds.max(0.0) * format.sample_rate as f64).round() as u64;
        Self::new(format, frequency, Some(frames))
    }

    fn next_frame(&mut self) -> bool {
        match &mut self.frames_left {
            Some(0) => return false,
            Some(left) => *left -= 1,
            None => {}
        }

        let sample = sine_wave(self.phase);
        for bytes in self.frame.chunks_exact_mut(2) {
            LittleEndian::write_i16(bytes, sample);
        }
        self.frame_pos = 0;

        // Increment the phase by the frequency divided by the sample rate
        self.phase += self.frequency / self.format.sample_rate as f64;
        // Wrap the phase around 1.0 to avoid overflow
        self.phase %= 1.0;

        true
    }
}

impl PcmSource for SineSource {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
        if self.frame.is_empty() {
            return Ok(0);
        }

        let mut written = 0;

        while written < buffer.len() {
            if self.frame_pos == self.frame.len() && !self.next_frame() {
                break;
            }

            let count = (self.frame.len() - self.frame_pos).min(buffer.len() - written);
            buffer[written..written + count]
                .copy_from_slice(&self.frame[self.frame_pos..self.frame_pos + count]);
            self.frame_pos += count;
            written += count;
        }

        Ok(written)
    }
}

// Generate a sine wave sample given a phase in [0, 1)
fn sine_wave(phase: f64) -> i16 {
    let sample = (phase * std::f64::consts::PI * 2.0).sin();
    let amplitude = i16::MAX as f64 * AMPLITUDE;
    (sample * amplitude) as i16
}
