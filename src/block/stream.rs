//! Streaming block sessions.
//!
//! A session carries its history across calls so that, in linked mode,
//! each block may reference bytes from the blocks before it. The encoder
//! and decoder variants must be driven with the same mode, dictionary and
//! block sequence for the output to round-trip.
//!
//! In unlinked mode the window stays at the dictionary (possibly empty) and
//! every block is independent of its predecessors.
//!
//! Sessions start [`SessionState::Fresh`] and become
//! [`SessionState::Primed`] after the first successful call. After an error
//! the session's window may no longer match its peer's and the session
//! should be discarded.

use super::compress::{compress_with_history, MatchTables};
use super::decompress::decompress_into;
use super::types::{compress_bound, BlockError, LZ4_MAX_INPUT_SIZE, WINDOW_SIZE};
use super::window::Window;
use crate::config::{strategy_for_level, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No block has gone through the session yet.
    Fresh,
    /// At least one block has been processed.
    Primed,
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoder
// ─────────────────────────────────────────────────────────────────────────────

/// Encoder half of a session.
///
/// In linked mode the match tables are carried between calls and only the
/// bytes added since the previous call are indexed, so a call costs time in
/// proportion to its own input. Unlinked calls re-index the dictionary.
pub struct BlockEncoderStream {
    strategy: Strategy,
    linked: bool,
    /// `[history | latest input]`. Linked sessions keep the stream tail here.
    buffer: Vec<u8>,
    /// Dictionary bytes at the front of `buffer` (unlinked sessions).
    dict_len: usize,
    total_in: u64,
    state: SessionState,
    tables: MatchTables,
}

impl BlockEncoderStream {
    /// New session at `level` (clamped, never rejected).
    pub fn new(level: i32, linked: bool) -> Self {
        Self::with_dictionary(level, linked, &[])
    }

    /// New session whose history starts as the last 64 KiB of `dictionary`.
    pub fn with_dictionary(level: i32, linked: bool, dictionary: &[u8]) -> Self {
        let keep = dictionary.len().min(WINDOW_SIZE);
        Self {
            strategy: strategy_for_level(level),
            linked,
            buffer: dictionary[dictionary.len() - keep..].to_vec(),
            dict_len: keep,
            total_in: 0,
            state: SessionState::Fresh,
            tables: MatchTables::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Bytes currently available to back-references.
    pub fn history(&self) -> &[u8] {
        if self.linked {
            &self.buffer[self.buffer.len().saturating_sub(WINDOW_SIZE)..]
        } else {
            &self.buffer[..self.dict_len]
        }
    }

    /// Total plaintext bytes encoded by this session.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Compress `input` as one block appended to `dest`; returns the number
    /// of bytes appended.
    pub fn encode(&mut self, input: &[u8], dest: &mut Vec<u8>) -> Result<usize, BlockError> {
        if input.len() > LZ4_MAX_INPUT_SIZE {
            return Err(BlockError::InputTooLarge(input.len()));
        }
        if self.linked {
            self.slide();
        } else {
            self.buffer.truncate(self.dict_len);
            self.tables.reset();
        }
        let start = self.buffer.len();
        self.buffer.extend_from_slice(input);

        let before = dest.len();
        dest.reserve(compress_bound(input.len()));
        compress_with_history(&self.buffer, start, self.strategy, &mut self.tables, dest);

        self.total_in += input.len() as u64;
        self.state = SessionState::Primed;
        Ok(dest.len() - before)
    }

    /// Drop whole 64 KiB units from the front of the buffer while at least
    /// one full window stays behind them.
    fn slide(&mut self) {
        let excess = self.buffer.len().saturating_sub(WINDOW_SIZE);
        let shift = excess - excess % WINDOW_SIZE;
        if shift > 0 {
            self.buffer.drain(..shift);
            self.tables.rebase(shift);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoder
// ─────────────────────────────────────────────────────────────────────────────

pub struct BlockDecoderStream {
    linked: bool,
    window: Window,
    state: SessionState,
    scratch: Vec<u8>,
}

impl BlockDecoderStream {
    pub fn new(linked: bool) -> Self {
        Self::with_dictionary(linked, &[])
    }

    pub fn with_dictionary(linked: bool, dictionary: &[u8]) -> Self {
        Self {
            linked,
            window: Window::with_dictionary(dictionary),
            state: SessionState::Fresh,
            scratch: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn history(&self) -> &[u8] {
        self.window.as_slice()
    }

    /// Total plaintext bytes produced by this session.
    pub fn total_out(&self) -> u64 {
        self.window.total_in()
    }

    /// Decompress one block, appending its plaintext to `dest`.
    ///
    /// `limit` caps the decoded size. On error nothing is appended.
    pub fn decode(
        &mut self,
        src: &[u8],
        dest: &mut Vec<u8>,
        limit: Option<usize>,
    ) -> Result<usize, BlockError> {
        self.scratch.clear();
        self.scratch.extend_from_slice(self.window.as_slice());
        let start = self.scratch.len();
        let produced = decompress_into(src, &mut self.scratch, 0, limit)?;

        let plain = &self.scratch[start..];
        dest.extend_from_slice(plain);
        if self.linked {
            self.window.push(plain);
        }
        self.state = SessionState::Primed;
        Ok(produced)
    }

    /// Account for a block that was stored uncompressed.
    pub fn push_raw(&mut self, data: &[u8], dest: &mut Vec<u8>) {
        dest.extend_from_slice(data);
        if self.linked {
            self.window.push(data);
        }
        self.state = SessionState::Primed;
    }
}
