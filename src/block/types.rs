//! LZ4 block constants, errors and the small byte helpers shared by the
//! compressors and the decompressor.
//!
//!   - Format constants (`MINMATCH`, `LASTLITERALS`, `MFLIMIT`, …)
//!   - [`BlockError`] and its [`ErrorKind`] classification
//!   - Little-endian reads over slices
//!   - `hash4` and `count` (match-finding helpers)
//!   - Sequence emission (`write_sequence`, `write_last_literals`)

use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Format constants
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum match length encoded in an LZ4 block.
pub const MINMATCH: usize = 4;

/// Last N bytes of a block are always emitted as literals.
pub const LASTLITERALS: usize = 5;

/// A match may not start within the last `MFLIMIT` bytes of a block.
pub const MFLIMIT: usize = 12;

/// Minimum input length that may produce any match at all.
pub const LZ4_MIN_LENGTH: usize = MFLIMIT + 1;

pub const KB: usize = 1 << 10;
pub const MB: usize = 1 << 20;

/// Largest back-reference distance the format can express.
pub const LZ4_DISTANCE_MAX: usize = 65_535;

/// History retained between linked blocks.
pub const WINDOW_SIZE: usize = 64 * KB;

/// Largest input a single block may describe.
pub const LZ4_MAX_INPUT_SIZE: usize = 0x7E00_0000;

pub const ML_BITS: u32 = 4;
pub const ML_MASK: usize = (1 << ML_BITS) - 1;
pub const RUN_BITS: u32 = 8 - ML_BITS;
pub const RUN_MASK: usize = (1 << RUN_BITS) - 1;

/// Log₂ of the fast matcher's hash-table entry count.
pub const LZ4_HASHLOG: u32 = 12;
/// Number of `u32` entries in the fast matcher's hash table.
pub const LZ4_HASH_SIZE_U32: usize = 1 << LZ4_HASHLOG;

/// The fast matcher skips faster once `1 << LZ4_SKIP_TRIGGER` probes miss.
pub const LZ4_SKIP_TRIGGER: u32 = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Broad classification shared by block and frame errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something that cannot be done with the given
    /// arguments (destination too small, input too large, stream closed).
    Usage,
    /// The compressed payload is corrupt or needs a dictionary that was not
    /// supplied.
    Codec,
    /// A frame header, block header or checksum is invalid.
    Format,
    /// The underlying byte source or sink failed.
    Io,
}

/// Errors produced by block compression and decompression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("compressed block needs {needed} bytes but the limit is {limit}")]
    OutputTooSmall { needed: usize, limit: usize },

    #[error("input of {0} bytes exceeds the block input limit")]
    InputTooLarge(usize),

    #[error("compressed block is truncated")]
    Truncated,

    #[error("compressed block is malformed")]
    Malformed,

    #[error(
        "match offset {offset} reaches before the {available} bytes of history \
         (missing dictionary?)"
    )]
    OffsetOutOfWindow { offset: usize, available: usize },

    #[error("decoded block exceeds {limit} bytes")]
    OutputLimitExceeded { limit: usize },
}

impl BlockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockError::InputTooLarge(_) => ErrorKind::Usage,
            _ => ErrorKind::Codec,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Byte helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read a little-endian `u32` at `pos`. Caller guarantees `pos + 4 <= buf.len()`.
#[inline(always)]
pub fn read32(buf: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]])
}

/// Read a little-endian `u16` at `pos`. Caller guarantees `pos + 2 <= buf.len()`.
#[inline(always)]
pub fn read_le16(buf: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([buf[pos], buf[pos + 1]])
}

/// 4-byte Knuth-multiplicative hash, `LZ4_HASHLOG` bits wide.
#[inline(always)]
pub fn hash4(sequence: u32) -> usize {
    (sequence.wrapping_mul(2_654_435_761) >> (32 - LZ4_HASHLOG)) as usize
}

/// Count how many bytes match between `buf[a..]` and `buf[b..]`, with `a`
/// stopping at `limit`. Requires `b < a <= limit <= buf.len()`.
#[inline(always)]
pub fn count(buf: &[u8], a: usize, b: usize, limit: usize) -> usize {
    const STEP: usize = core::mem::size_of::<u64>();
    let mut n = 0;
    while a + n + STEP <= limit {
        let x = u64::from_le_bytes(word(buf, a + n));
        let y = u64::from_le_bytes(word(buf, b + n));
        let diff = x ^ y;
        if diff != 0 {
            return n + (diff.trailing_zeros() >> 3) as usize;
        }
        n += STEP;
    }
    while a + n < limit && buf[a + n] == buf[b + n] {
        n += 1;
    }
    n
}

#[inline(always)]
fn word(buf: &[u8], pos: usize) -> [u8; 8] {
    let mut w = [0u8; 8];
    w.copy_from_slice(&buf[pos..pos + 8]);
    w
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequence emission
// ─────────────────────────────────────────────────────────────────────────────

/// Append the 255-run encoding of a length remainder.
#[inline]
fn write_length(dst: &mut Vec<u8>, mut len: usize) {
    while len >= 255 {
        dst.push(255);
        len -= 255;
    }
    dst.push(len as u8);
}

/// Append one sequence: token, literal run, offset and match length.
///
/// `match_len` is the full match length (at least [`MINMATCH`]).
pub fn write_sequence(dst: &mut Vec<u8>, literals: &[u8], offset: usize, match_len: usize) {
    debug_assert!(match_len >= MINMATCH);
    debug_assert!(offset >= 1 && offset <= LZ4_DISTANCE_MAX);
    let lit_len = literals.len();
    let ml_code = match_len - MINMATCH;
    let token = (lit_len.min(RUN_MASK) << ML_BITS) | ml_code.min(ML_MASK);
    dst.push(token as u8);
    if lit_len >= RUN_MASK {
        write_length(dst, lit_len - RUN_MASK);
    }
    dst.extend_from_slice(literals);
    dst.extend_from_slice(&(offset as u16).to_le_bytes());
    if ml_code >= ML_MASK {
        write_length(dst, ml_code - ML_MASK);
    }
}

/// Append the closing literal-only sequence. Always emits a token, so an
/// empty block encodes to a single `0x00`.
pub fn write_last_literals(dst: &mut Vec<u8>, literals: &[u8]) {
    let lit_len = literals.len();
    dst.push((lit_len.min(RUN_MASK) << ML_BITS) as u8);
    if lit_len >= RUN_MASK {
        write_length(dst, lit_len - RUN_MASK);
    }
    dst.extend_from_slice(literals);
}

/// Worst-case compressed size of `n` input bytes, or 0 when `n` is larger
/// than [`LZ4_MAX_INPUT_SIZE`].
#[inline]
pub const fn compress_bound(n: usize) -> usize {
    if n > LZ4_MAX_INPUT_SIZE {
        0
    } else {
        n + n / 255 + 16
    }
}
