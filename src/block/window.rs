//! Dictionary window: the most recent [`WINDOW_SIZE`] bytes of a stream.
//!
//! Bytes are appended at the back. Storage is allowed to grow to twice the
//! window before the front is dropped, so sliding costs one `drain` per
//! 64 KiB pushed rather than one per call.

use super::types::WINDOW_SIZE;

#[derive(Debug, Clone, Default)]
pub struct Window {
    buf: Vec<u8>,
    total: u64,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window seeded with the tail of `dictionary`. Seeding does not count
    /// towards [`total_in`](Self::total_in).
    pub fn with_dictionary(dictionary: &[u8]) -> Self {
        let keep = dictionary.len().min(WINDOW_SIZE);
        Self {
            buf: dictionary[dictionary.len() - keep..].to_vec(),
            total: 0,
        }
    }

    /// Append `data`, sliding out bytes older than the window.
    pub fn push(&mut self, data: &[u8]) {
        self.total += data.len() as u64;
        if data.len() >= WINDOW_SIZE {
            self.buf.clear();
            self.buf.extend_from_slice(&data[data.len() - WINDOW_SIZE..]);
            return;
        }
        self.buf.extend_from_slice(data);
        if self.buf.len() > 2 * WINDOW_SIZE {
            let excess = self.buf.len() - WINDOW_SIZE;
            self.buf.drain(..excess);
        }
    }

    /// The retained history, at most [`WINDOW_SIZE`] bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[self.buf.len().saturating_sub(WINDOW_SIZE)..]
    }

    pub fn len(&self) -> usize {
        self.buf.len().min(WINDOW_SIZE)
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Total bytes pushed since creation.
    pub fn total_in(&self) -> u64 {
        self.total
    }
}
