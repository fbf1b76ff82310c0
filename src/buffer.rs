//! Byte staging between the source, the stretcher and the caller.
//!
//! The pull loop works in whole frames while both of its neighbours work in
//! arbitrary byte counts. `InputLeftover` holds the partial frame at the end
//! of a source read, `OutputLeftover` holds encoded bytes the caller had no
//! room for. They are separate types on purpose and are never merged.

/// Trailing bytes of a source read that did not complete a frame.
///
/// Always shorter than one frame.
#[derive(Debug)]
pub struct InputLeftover {
    bytes: Vec<u8>,
    bytes_per_frame: usize,
}

impl InputLeftover {
    pub fn new(bytes_per_frame: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes_per_frame.saturating_sub(1)),
            bytes_per_frame,
        }
    }

    /// Replace the staged bytes with `tail`.
    pub fn stash(&mut self, tail: &[u8]) {
        debug_assert!(tail.len() < self.bytes_per_frame);
        self.bytes.clear();
        self.bytes.extend_from_slice(tail);
    }

    /// Move the staged bytes to the front of `dest`, returning how many were written.
    pub fn take_into(&mut self, dest: &mut [u8]) -> usize {
        let count = self.bytes.len();
        dest[..count].copy_from_slice(&self.bytes);
        self.bytes.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

/// Encoded output bytes waiting for the next read call, oldest first.
#[derive(Debug, Default)]
pub struct OutputLeftover {
    position: usize,
    buffer: Vec<u8>,
}

impl OutputLeftover {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            position: 0,
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.position = 0;
        self.buffer.clear();
    }

    /// Drop already-delivered bytes so the queue starts at index 0 again
    fn compact(&mut self) {
        if self.position > 0 {
            self.buffer.drain(..self.position);
            self.position = 0;
        }
    }

    pub fn push(&mut self, byte: u8) {
        if self.position > 0 {
            self.compact();
        }
        self.buffer.push(byte);
    }

    /// Copy as many staged bytes as fit into `dest`, returning the count.
    pub fn drain_into(&mut self, dest: &mut [u8]) -> usize {
        let count = dest.len().min(self.len());

        if count > 0 {
            dest[..count].copy_from_slice(&self.buffer[self.position..self.position + count]);
            self.position += count;
        }

        if self.position == self.buffer.len() {
            self.clear();
        }

        count
    }

    pub fn len(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
