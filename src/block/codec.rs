//! One-shot block encode/decode.
//!
//! Both directions append to a caller-owned `Vec<u8>` and hand the same
//! vector back, so a buffer can be reused across calls. On failure the
//! destination is truncated back to its length on entry.

use super::decompress::{decode_size as scan_decoded_size, decompress_into};
use super::stream::{BlockDecoderStream, BlockEncoderStream};
use super::types::{compress_bound, BlockError, LZ4_MAX_INPUT_SIZE};
use crate::config::CLEVEL_DEFAULT;

/// Options for [`encode`].
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions<'a> {
    /// Compression level; any value is accepted and clamped.
    pub level: i32,
    /// External history ("predict"). Only its last 64 KiB are used, and the
    /// same bytes must be handed to [`decode`].
    pub dictionary: Option<&'a [u8]>,
    /// Largest compressed size the caller accepts.
    pub max_size: Option<usize>,
}

impl Default for EncodeOptions<'_> {
    fn default() -> Self {
        Self {
            level: CLEVEL_DEFAULT,
            dictionary: None,
            max_size: None,
        }
    }
}

/// Options for [`decode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions<'a> {
    /// Expected plaintext size, used to presize the destination. Not a cap.
    pub size_hint: Option<usize>,
    /// Hard cap on the plaintext size.
    pub max_size: Option<usize>,
    /// The dictionary given to [`encode`], if any.
    pub dictionary: Option<&'a [u8]>,
}

/// Upper bound on the encoded size of `n` input bytes (0 if `n` is too large
/// for one block).
pub fn encode_size(n: usize) -> usize {
    compress_bound(n)
}

/// Compress `input` as one LZ4 block appended to `dest`.
pub fn encode<'d>(
    input: &[u8],
    opts: &EncodeOptions<'_>,
    dest: &'d mut Vec<u8>,
) -> Result<&'d mut Vec<u8>, BlockError> {
    if input.len() > LZ4_MAX_INPUT_SIZE {
        return Err(BlockError::InputTooLarge(input.len()));
    }
    let entry = dest.len();
    let mut session =
        BlockEncoderStream::with_dictionary(opts.level, false, opts.dictionary.unwrap_or(&[]));
    let needed = session.encode(input, dest)?;

    if let Some(limit) = opts.max_size {
        if needed > limit {
            dest.truncate(entry);
            return Err(BlockError::OutputTooSmall { needed, limit });
        }
    }
    Ok(dest)
}

/// [`encode`] into a fresh vector.
pub fn encode_to_vec(input: &[u8], opts: &EncodeOptions<'_>) -> Result<Vec<u8>, BlockError> {
    let mut out = Vec::with_capacity(encode_size(input.len()));
    encode(input, opts, &mut out)?;
    Ok(out)
}

/// Decompress one LZ4 block appended to `dest`.
pub fn decode<'d>(
    src: &[u8],
    opts: &DecodeOptions<'_>,
    dest: &'d mut Vec<u8>,
) -> Result<&'d mut Vec<u8>, BlockError> {
    let presize = match opts.size_hint {
        Some(hint) => hint.min(max_expansion(src.len())),
        None => scan_decoded_size(src)?,
    };
    let entry = dest.len();
    dest.reserve(presize);

    let result = match opts.dictionary {
        None => decompress_into(src, dest, entry, opts.max_size),
        Some(dict) => BlockDecoderStream::with_dictionary(false, dict).decode(src, dest, opts.max_size),
    };
    if let Err(e) = result {
        dest.truncate(entry);
        return Err(e);
    }
    Ok(dest)
}

/// [`decode`] into a fresh vector.
pub fn decode_to_vec(src: &[u8], opts: &DecodeOptions<'_>) -> Result<Vec<u8>, BlockError> {
    let mut out = Vec::new();
    decode(src, opts, &mut out)?;
    Ok(out)
}

/// Plaintext size of a block, without decoding it.
pub fn decode_size(src: &[u8]) -> Result<usize, BlockError> {
    scan_decoded_size(src)
}

// Each compressed byte expands to at most 255 plaintext bytes.
fn max_expansion(compressed: usize) -> usize {
    compressed.saturating_mul(255).saturating_add(16)
}
