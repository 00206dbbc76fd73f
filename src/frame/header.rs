//! Frame header encoding and parsing, byte-order helpers and size bounds.
//!
//! Header layout:
//!
//! ```text
//! magic(4) FLG(1) BD(1) [content size(8)] [dict ID(4)] HC(1)
//! ```
//!
//! FLG: version (bits 7-6) | B.Indep (5) | B.Checksum (4) | C.Size (3) |
//! C.Checksum (2) | reserved (1) | DictID (0).
//! BD: reserved (7) | block max size ID (6-4) | reserved (3-0).
//! HC is the second byte of XXH32 over FLG..dict ID.

use crate::block::encode_size;
use crate::frame::types::{
    BlockMode, BlockSizeId, FrameError, FrameInfo, FrameType, Preferences, BF_SIZE, BH_SIZE,
    CONTENT_CHECKSUM_SIZE, LZ4F_MAGICNUMBER, LZ4F_MAGIC_SKIPPABLE_MASK,
    LZ4F_MAGIC_SKIPPABLE_START, LZ4F_VERSION, MAX_FH_SIZE, MIN_FH_SIZE,
};
use crate::xxhash::{xxh32_oneshot, FRAME_SEED};

const FLG_BLOCK_INDEPENDENCE: u8 = 1 << 5;
const FLG_BLOCK_CHECKSUM: u8 = 1 << 4;
const FLG_CONTENT_SIZE: u8 = 1 << 3;
const FLG_CONTENT_CHECKSUM: u8 = 1 << 2;
const FLG_RESERVED: u8 = 1 << 1;
const FLG_DICT_ID: u8 = 1;
const BD_RESERVED: u8 = 0x8F;

/// Bytes needed before [`header_size`] can tell the full header length.
pub const HEADER_PREFIX_SIZE: usize = 5;

/// Size of a skippable frame's fixed part (magic + length).
pub const SKIPPABLE_HEADER_SIZE: usize = 8;

// ─────────────────────────────────────────────────────────────────────────────
// Byte-order helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read a little-endian `u32` from `src` at byte `offset`.
#[inline]
pub fn read_le32(src: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([src[offset], src[offset + 1], src[offset + 2], src[offset + 3]])
}

/// Read a little-endian `u64` from `src` at byte `offset`.
#[inline]
pub fn read_le64(src: &[u8], offset: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&src[offset..offset + 8]);
    u64::from_le_bytes(b)
}

#[inline]
pub fn is_skippable_magic(magic: u32) -> bool {
    magic & LZ4F_MAGIC_SKIPPABLE_MASK == LZ4F_MAGIC_SKIPPABLE_START
}

/// Header checksum byte: `(XXH32(descriptor, 0) >> 8) & 0xFF`.
#[inline]
pub fn header_checksum(descriptor: &[u8]) -> u8 {
    (xxh32_oneshot(descriptor, FRAME_SEED) >> 8) as u8
}

// ─────────────────────────────────────────────────────────────────────────────
// Writing
// ─────────────────────────────────────────────────────────────────────────────

/// Append the header for `info` to `dest`; returns the bytes written.
pub fn write_header(info: &FrameInfo, dest: &mut Vec<u8>) -> usize {
    let start = dest.len();
    dest.extend_from_slice(&LZ4F_MAGICNUMBER.to_le_bytes());

    let mut flg = LZ4F_VERSION << 6;
    if info.block_mode == BlockMode::Independent {
        flg |= FLG_BLOCK_INDEPENDENCE;
    }
    if info.block_checksum {
        flg |= FLG_BLOCK_CHECKSUM;
    }
    if info.content_size.is_some() {
        flg |= FLG_CONTENT_SIZE;
    }
    if info.content_checksum {
        flg |= FLG_CONTENT_CHECKSUM;
    }
    if info.dict_id.is_some() {
        flg |= FLG_DICT_ID;
    }
    dest.push(flg);
    dest.push(info.block_size_id.code() << 4);

    if let Some(size) = info.content_size {
        dest.extend_from_slice(&size.to_le_bytes());
    }
    if let Some(id) = info.dict_id {
        dest.extend_from_slice(&id.to_le_bytes());
    }
    let hc = header_checksum(&dest[start + 4..]);
    dest.push(hc);
    dest.len() - start
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Full header length announced by the first [`HEADER_PREFIX_SIZE`] bytes
/// (or [`SKIPPABLE_HEADER_SIZE`] for a skippable frame).
pub fn header_size(prefix: &[u8]) -> Result<usize, FrameError> {
    if prefix.len() < 4 {
        return Err(FrameError::Truncated);
    }
    let magic = read_le32(prefix, 0);
    if is_skippable_magic(magic) {
        return Ok(SKIPPABLE_HEADER_SIZE);
    }
    if magic != LZ4F_MAGICNUMBER {
        return Err(FrameError::BadMagic(magic));
    }
    let flg = *prefix.get(4).ok_or(FrameError::Truncated)?;
    Ok(MIN_FH_SIZE
        + if flg & FLG_CONTENT_SIZE != 0 { 8 } else { 0 }
        + if flg & FLG_DICT_ID != 0 { 4 } else { 0 })
}

/// Parse a complete LZ4 frame header.
pub fn parse_header(header: &[u8]) -> Result<FrameInfo, FrameError> {
    let size = header_size(header)?;
    if header.len() < size {
        return Err(FrameError::Truncated);
    }
    let magic = read_le32(header, 0);
    if is_skippable_magic(magic) {
        return Ok(FrameInfo {
            frame_type: FrameType::SkippableFrame,
            content_size: Some(read_le32(header, 4) as u64),
            ..FrameInfo::default()
        });
    }

    let flg = header[4];
    let bd = header[5];
    let version = flg >> 6;
    if version != LZ4F_VERSION {
        return Err(FrameError::UnsupportedVersion(version));
    }
    if flg & FLG_RESERVED != 0 || bd & BD_RESERVED != 0 {
        return Err(FrameError::ReservedFlagSet);
    }
    let code = (bd >> 4) & 0x07;
    let block_size_id = BlockSizeId::from_code(code).ok_or(FrameError::BlockSizeInvalid(code))?;

    let stored = header[size - 1];
    let computed = header_checksum(&header[4..size - 1]);
    if stored != computed {
        return Err(FrameError::HeaderChecksum { stored, computed });
    }

    let mut pos = 6;
    let content_size = if flg & FLG_CONTENT_SIZE != 0 {
        pos += 8;
        Some(read_le64(header, pos - 8))
    } else {
        None
    };
    let dict_id = if flg & FLG_DICT_ID != 0 {
        Some(read_le32(header, pos))
    } else {
        None
    };

    Ok(FrameInfo {
        frame_type: FrameType::Frame,
        block_size_id,
        block_mode: if flg & FLG_BLOCK_INDEPENDENCE != 0 {
            BlockMode::Independent
        } else {
            BlockMode::Linked
        },
        block_checksum: flg & FLG_BLOCK_CHECKSUM != 0,
        content_checksum: flg & FLG_CONTENT_CHECKSUM != 0,
        content_size,
        dict_id,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Bounds
// ─────────────────────────────────────────────────────────────────────────────

/// Worst-case size of a whole frame holding `src_size` bytes.
///
/// Incompressible blocks are stored raw, so each block costs at most its
/// plaintext plus header and optional checksum.
pub fn compress_frame_bound(src_size: usize, prefs: &Preferences) -> usize {
    let block_size = prefs.block_size.max_block_size();
    let nb_blocks = src_size.div_ceil(block_size);
    let block_overhead = BH_SIZE + if prefs.block_checksum { BF_SIZE } else { 0 };
    let trailer = BH_SIZE
        + if prefs.content_checksum {
            CONTENT_CHECKSUM_SIZE
        } else {
            0
        };
    MAX_FH_SIZE + src_size + nb_blocks * block_overhead + trailer
}

/// Worst-case compressed payload of one block before the raw fallback.
pub fn block_payload_bound(block_size: usize) -> usize {
    encode_size(block_size)
}
