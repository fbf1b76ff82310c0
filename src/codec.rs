//! Conversion between interleaved little-endian 16-bit PCM bytes and
//! per-channel normalized `f32` blocks.

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::{BYTES_PER_SAMPLE, SAMPLE_SCALE};

/// Decodes `frames` complete interleaved frames from `bytes` into `blocks`,
/// one block per channel.
///
/// Samples are reinterpreted as two's-complement and divided by 32768, so the
/// result always lies in `[-1.0, 1.0)`.
pub fn decode_frames(bytes: &[u8], blocks: &mut [Vec<f32>], frames: usize) {
    let channels = blocks.len();
    let bytes_per_frame = channels * BYTES_PER_SAMPLE;
    debug_assert!(bytes.len() >= frames * bytes_per_frame);

    for (c, block) in blocks.iter_mut().enumerate() {
        for (i, out) in block.iter_mut().take(frames).enumerate() {
            let offset = i * bytes_per_frame + c * BYTES_PER_SAMPLE;
            let sample = LittleEndian::read_i16(&bytes[offset..offset + BYTES_PER_SAMPLE]);
            *out = sample as f32 / SAMPLE_SCALE;
        }
    }
}

/// Converts one normalized sample back to 16-bit PCM.
///
/// Out-of-range values saturate before scaling, and the scaled value is
/// clamped again afterwards. NaN encodes as silence.
pub fn encode_sample(value: f32) -> [u8; 2] {
    let sample = if value <= -1.0 {
        i16::MIN
    } else if value >= 1.0 {
        i16::MAX
    } else {
        // `as` truncates toward zero
        let scaled = (value * SAMPLE_SCALE) as i32;
        scaled.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    };

    let mut bytes = [0u8; 2];
    LittleEndian::write_i16(&mut bytes, sample);
    bytes
}

/// Interleaves `frames` frames from `blocks` and hands every encoded byte to
/// `sink`, in stream order.
pub fn encode_frames<F: FnMut(u8)>(blocks: &[Vec<f32>], frames: usize, mut sink: F) {
    for i in 0..frames {
        for block in blocks {
            let [low, high] = encode_sample(block[i]);
            sink(low);
            sink(high);
        }
    }
}
