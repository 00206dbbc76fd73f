//! LZ4 block compression, fast (single-probe hash table) matcher.
//!
//! Every compressor in this crate works over one contiguous buffer laid out
//! as `[history | input]`: `start` is the offset of the first input byte and
//! everything before it is dictionary or previous-block content that
//! back-references may target (up to [`LZ4_DISTANCE_MAX`] bytes back). Only
//! `buf[start..]` is encoded.
//!
//! [`compress_with_history`] dispatches to the fast matcher here or to the
//! hash-chain matcher in [`super::hc`] according to a [`Strategy`].
//!
//! See the [LZ4 block format specification] for the on-disk layout.
//!
//! [LZ4 block format specification]: https://github.com/lz4/lz4/blob/dev/doc/lz4_Block_format.md

use super::hc::ChainTables;
use super::types::{
    count, hash4, read32, write_last_literals, write_sequence, LASTLITERALS, LZ4_DISTANCE_MAX,
    LZ4_HASH_SIZE_U32, LZ4_MIN_LENGTH, LZ4_SKIP_TRIGGER, MFLIMIT, MINMATCH, WINDOW_SIZE,
};
use crate::config::Strategy;

// ─────────────────────────────────────────────────────────────────────────────
// Match tables
// ─────────────────────────────────────────────────────────────────────────────

/// Reusable match-finder state.
///
/// Entries are positions in the caller's `[history | input]` buffer. A
/// linked session keeps one of these across calls and only indexes bytes
/// added since the previous call; [`rebase`](Self::rebase) follows the
/// buffer when whole 64 KiB units are dropped from its front. Any other
/// buffer needs a [`reset`](Self::reset) first.
#[derive(Default)]
pub struct MatchTables {
    hash: Vec<u32>,
    /// Every position below this is already in `hash`.
    hashed: usize,
    chain: Option<Box<ChainTables>>,
}

impl MatchTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every indexed position.
    pub fn reset(&mut self) {
        self.hash.fill(0);
        self.hashed = 0;
        if let Some(chain) = &mut self.chain {
            chain.reset();
        }
    }

    /// Shift stored positions down after the caller drained `shift` bytes
    /// from the front of its buffer. `shift` is a multiple of [`WINDOW_SIZE`].
    pub fn rebase(&mut self, shift: usize) {
        debug_assert_eq!(shift % WINDOW_SIZE, 0);
        let delta = shift as u32;
        for slot in &mut self.hash {
            *slot = slot.saturating_sub(delta);
        }
        self.hashed = self.hashed.saturating_sub(shift);
        if let Some(chain) = &mut self.chain {
            chain.rebase(shift);
        }
    }

    /// First position the fast matcher has not indexed yet.
    pub fn hashed(&self) -> usize {
        self.hashed
    }

    fn hash_table(&mut self) -> &mut [u32] {
        if self.hash.len() != LZ4_HASH_SIZE_U32 {
            self.hash = vec![0u32; LZ4_HASH_SIZE_U32];
        }
        &mut self.hash
    }

    fn chain_tables(&mut self) -> &mut ChainTables {
        self.chain.get_or_insert_with(|| Box::new(ChainTables::new()))
    }
}

/// Compress `buf[start..]` using `buf[..start]` as history, appending the
/// block to `dst`.
pub fn compress_with_history(
    buf: &[u8],
    start: usize,
    strategy: Strategy,
    tables: &mut MatchTables,
    dst: &mut Vec<u8>,
) {
    match strategy {
        Strategy::Fast { acceleration } => {
            let hashed = tables.hashed;
            let hashed = compress_fast(buf, start, hashed, acceleration, tables.hash_table(), dst);
            tables.hashed = hashed;
        }
        Strategy::Chain { max_attempts } => {
            tables.chain_tables().compress(buf, start, max_attempts, dst)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fast matcher
// ─────────────────────────────────────────────────────────────────────────────

/// Single-probe greedy compressor.
///
/// `table` holds [`LZ4_HASH_SIZE_U32`] positions into `buf` and already
/// covers every history position below `hashed` (zeroed with `hashed == 0`
/// for a fresh buffer). Returns the new bound. Larger `acceleration` makes
/// the probe step grow sooner on incompressible input.
pub fn compress_fast(
    buf: &[u8],
    start: usize,
    hashed: usize,
    acceleration: u32,
    table: &mut [u32],
    dst: &mut Vec<u8>,
) -> usize {
    debug_assert_eq!(table.len(), LZ4_HASH_SIZE_U32);
    let end = buf.len();
    let mut anchor = start;

    if end - start < LZ4_MIN_LENGTH {
        write_last_literals(dst, &buf[anchor..]);
        return hashed;
    }

    let mflimit_plus_one = end - MFLIMIT + 1;
    let matchlimit = end - LASTLITERALS;

    // History positions go in oldest first so the table keeps the nearest.
    for pos in hashed..start {
        table[hash4(read32(buf, pos))] = pos as u32;
    }

    // First input byte: record only, nothing to match against yet.
    let mut ip = start;
    table[hash4(read32(buf, ip))] = ip as u32;
    ip += 1;
    let mut forward_h = hash4(read32(buf, ip));

    'sequences: loop {
        // Find a match.
        let mut forward_ip = ip;
        let mut step = 1usize;
        let mut search_nb = acceleration << LZ4_SKIP_TRIGGER;
        let mut candidate;
        loop {
            let h = forward_h;
            ip = forward_ip;
            forward_ip += step;
            step = (search_nb >> LZ4_SKIP_TRIGGER) as usize;
            search_nb += 1;

            if forward_ip > mflimit_plus_one {
                break 'sequences;
            }

            candidate = table[h] as usize;
            forward_h = hash4(read32(buf, forward_ip));
            table[h] = ip as u32;

            if candidate + LZ4_DISTANCE_MAX < ip {
                continue;
            }
            if read32(buf, candidate) == read32(buf, ip) {
                break;
            }
        }

        // Extend backwards over bytes the literal run would otherwise carry.
        while ip > anchor && candidate > 0 && buf[ip - 1] == buf[candidate - 1] {
            ip -= 1;
            candidate -= 1;
        }

        loop {
            let match_len =
                MINMATCH + count(buf, ip + MINMATCH, candidate + MINMATCH, matchlimit);
            write_sequence(dst, &buf[anchor..ip], ip - candidate, match_len);
            ip += match_len;
            anchor = ip;

            if ip >= mflimit_plus_one {
                break 'sequences;
            }

            table[hash4(read32(buf, ip - 2))] = (ip - 2) as u32;

            // Immediate follow-up match: zero-literal sequence.
            let h = hash4(read32(buf, ip));
            let next = table[h] as usize;
            table[h] = ip as u32;
            if next + LZ4_DISTANCE_MAX >= ip && read32(buf, next) == read32(buf, ip) {
                candidate = next;
                continue;
            }
            break;
        }

        ip += 1;
        forward_h = hash4(read32(buf, ip));
    }

    write_last_literals(dst, &buf[anchor..]);
    start
}
