use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use anyhow::{Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use hound::WavReader;

use super::{PcmSource, StreamFormat};

/// PCM bytes decoded from a WAV container.
///
/// The format is reported exactly as the file declares it; rejecting
/// anything that is not 16-bit is left to the stream.
pub struct WavSource<R: Read> {
    reader: WavReader<R>,
    format: StreamFormat,
    /// High byte of a sample that did not fit in the previous read
    pending: Option<u8>,
    /// Decode error held back until the bytes before it are handed out
    error: Option<std::io::Error>,
}

impl WavSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = WavReader::open(path)
            .with_context(|| format!("Could not open WAV file {}", path.display()))?;
        Ok(Self::from_reader(reader))
    }
}

impl<R: Read> WavSource<R> {
    pub fn new(inner: R) -> Result<Self> {
        let reader = WavReader::new(inner).context("Could not parse WAV header")?;
        Ok(Self::from_reader(reader))
    }

    fn from_reader(reader: WavReader<R>) -> Self {
        let spec = reader.spec();
        let format = StreamFormat {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
        };

        Self {
            reader,
            format,
            pending: None,
            error: None,
        }
    }

    /// Samples (not frames) in the file
    pub fn total_samples(&self) -> u32 {
        self.reader.len()
    }
}

fn into_io_error(e: hound::Error) -> std::io::Error {
    match e {
        hound::Error::IoError(e) => e,
        e => std::io::Error::new(ErrorKind::InvalidData, e),
    }
}

impl<R: Read> PcmSource for WavSource<R> {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
        if buffer.is_empty() {
            return Ok(0);
        }
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let mut written = 0;

        if let Some(high) = self.pending.take() {
            buffer[written] = high;
            written += 1;
        }

        while written < buffer.len() {
            let sample = match self.reader.samples::<i16>().next() {
                Some(Ok(sample)) => sample,
                Some(Err(e)) if written > 0 => {
                    self.error = Some(into_io_error(e));
                    break;
                }
                Some(Err(e)) => return Err(into_io_error(e)),
                None => break,
            };

            let mut bytes = [0u8; 2];
            LittleEndian::write_i16(&mut bytes, sample);

            buffer[written] = bytes[0];
            written += 1;

            if written < buffer.len() {
                buffer[written] = bytes[1];
                written += 1;
            } else {
                self.pending = Some(bytes[1]);
            }
        }

        Ok(written)
    }
}
