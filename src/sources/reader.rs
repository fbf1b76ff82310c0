use std::io::{ErrorKind, Read};

use super::{PcmSource, StreamFormat};

/// Raw interleaved PCM bytes from any reader, e.g. a headerless file or an
/// in-memory `Cursor`.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
    format: StreamFormat,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R, format: StreamFormat) -> Self {
        Self { inner, format }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> PcmSource for ReaderSource<R> {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
        loop {
            match self.inner.read(buffer) {
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }
}
