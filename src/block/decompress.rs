//! LZ4 block decompression.
//!
//! The decoder appends to a `Vec<u8>` that may already hold history
//! (dictionary or previous linked blocks) in front of the new output. Every
//! length and offset read from the compressed stream is bounds-checked, so
//! corrupt input yields a [`BlockError`] and never reads outside the buffers.
//!
//! A back-reference that reaches before the history start is reported as
//! [`BlockError::OffsetOutOfWindow`]; this is how a missing dictionary is
//! usually noticed.

use super::types::{read_le16, BlockError, MINMATCH, ML_MASK, RUN_BITS, RUN_MASK};

/// Read a 255-run length extension starting at `*ip`.
#[inline]
fn read_length(src: &[u8], ip: &mut usize) -> Result<usize, BlockError> {
    let mut len = 0usize;
    loop {
        let byte = *src.get(*ip).ok_or(BlockError::Truncated)?;
        *ip += 1;
        len = len.checked_add(byte as usize).ok_or(BlockError::Malformed)?;
        if byte != 255 {
            return Ok(len);
        }
    }
}

/// Copy `len` bytes starting `offset` bytes back from the end of `out`.
/// Overlapping copies repeat the pattern, as the format requires.
#[inline]
fn copy_match(out: &mut Vec<u8>, offset: usize, len: usize) {
    out.reserve(len);
    let mut from = out.len() - offset;
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(out.len() - from);
        out.extend_from_within(from..from + n);
        from += n;
        remaining -= n;
    }
}

/// Decode one block from `src`, appending the plaintext to `out`.
///
/// Back-references may reach into `out[history_start..]`. `limit`, when
/// set, caps the number of bytes this block may produce. Returns the number
/// of bytes appended. On error `out` may hold a partial block; callers that
/// need all-or-nothing behaviour truncate it.
pub fn decompress_into(
    src: &[u8],
    out: &mut Vec<u8>,
    history_start: usize,
    limit: Option<usize>,
) -> Result<usize, BlockError> {
    debug_assert!(history_start <= out.len());
    let out_start = out.len();
    let cap = limit.unwrap_or(usize::MAX);
    let mut ip = 0usize;

    if src.is_empty() {
        return Err(BlockError::Truncated);
    }

    loop {
        let token = *src.get(ip).ok_or(BlockError::Truncated)? as usize;
        ip += 1;

        // Literals.
        let mut lit_len = token >> RUN_BITS;
        if lit_len == RUN_MASK {
            lit_len += read_length(src, &mut ip)?;
        }
        let lit_end = ip.checked_add(lit_len).ok_or(BlockError::Malformed)?;
        if lit_end > src.len() {
            return Err(BlockError::Truncated);
        }
        if out.len() - out_start + lit_len > cap {
            return Err(BlockError::OutputLimitExceeded { limit: cap });
        }
        out.extend_from_slice(&src[ip..lit_end]);
        ip = lit_end;

        // The last sequence carries literals only.
        if ip == src.len() {
            break;
        }

        // Match.
        if ip + 2 > src.len() {
            return Err(BlockError::Truncated);
        }
        let offset = read_le16(src, ip) as usize;
        ip += 2;
        if offset == 0 {
            return Err(BlockError::Malformed);
        }
        let available = out.len() - history_start;
        if offset > available {
            return Err(BlockError::OffsetOutOfWindow { offset, available });
        }

        let mut match_len = token & ML_MASK;
        if match_len == ML_MASK {
            match_len += read_length(src, &mut ip)?;
        }
        match_len += MINMATCH;
        if (out.len() - out_start).saturating_add(match_len) > cap {
            return Err(BlockError::OutputLimitExceeded { limit: cap });
        }
        copy_match(out, offset, match_len);
    }

    Ok(out.len() - out_start)
}

/// Decoded length of a block, computed by walking its sequences without
/// producing output. Offsets are not checked against any history.
pub fn decode_size(src: &[u8]) -> Result<usize, BlockError> {
    if src.is_empty() {
        return Err(BlockError::Truncated);
    }
    let mut ip = 0usize;
    let mut total = 0usize;
    loop {
        let token = *src.get(ip).ok_or(BlockError::Truncated)? as usize;
        ip += 1;
        let mut lit_len = token >> RUN_BITS;
        if lit_len == RUN_MASK {
            lit_len += read_length(src, &mut ip)?;
        }
        ip = ip.checked_add(lit_len).ok_or(BlockError::Malformed)?;
        if ip > src.len() {
            return Err(BlockError::Truncated);
        }
        total = total.checked_add(lit_len).ok_or(BlockError::Malformed)?;
        if ip == src.len() {
            return Ok(total);
        }
        if ip + 2 > src.len() {
            return Err(BlockError::Truncated);
        }
        if read_le16(src, ip) == 0 {
            return Err(BlockError::Malformed);
        }
        ip += 2;
        let mut match_len = token & ML_MASK;
        if match_len == ML_MASK {
            match_len += read_length(src, &mut ip)?;
        }
        total = total
            .checked_add(match_len + MINMATCH)
            .ok_or(BlockError::Malformed)?;
    }
}
