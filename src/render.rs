//! Draining a finite stream into a WAV file.

use std::io::{Seek, Write};
use std::path::Path;

use anyhow::{Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::sources::PcmSource;
use crate::stream::TempoStream;
use crate::stretcher::TimeStretcher;

/// Read `stream` until it is exhausted and write the result as WAV.
///
/// The zero padding that follows end of stream is not written. Returns the
/// number of frames written.
pub fn render<S, T, W>(stream: &mut TempoStream<S, T>, writer: W) -> Result<u64>
where
    S: PcmSource,
    T: TimeStretcher,
    W: Write + Seek,
{
    let format = stream.format();
    let spec = WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::new(writer, spec).context("Could not write WAV header")?;
    let mut chunk = vec![0u8; stream.block_frames() * format.bytes_per_frame()];
    let mut bytes_written: u64 = 0;

    while !stream.is_exhausted() {
        let padding_before = stream.stats().padding_bytes;
        stream.fill(&mut chunk);
        let padded = (stream.stats().padding_bytes - padding_before) as usize;
        let audio = &chunk[..chunk.len() - padded];

        for bytes in audio.chunks_exact(2) {
            writer.write_sample(LittleEndian::read_i16(bytes))?;
        }
        bytes_written += audio.len() as u64;
    }

    writer.finalize().context("Could not finalize WAV file")?;

    let frames = bytes_written / format.bytes_per_frame() as u64;
    debug!("Rendered {frames} frames");
    Ok(frames)
}

pub fn render_to_wav<S, T, P>(stream: &mut TempoStream<S, T>, path: P) -> Result<u64>
where
    S: PcmSource,
    T: TimeStretcher,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Could not create {}", path.display()))?;

    render(stream, std::io::BufWriter::new(file))
}
