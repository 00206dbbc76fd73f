//! LZ4 frame format types, constants and errors.
//!
//! Covers:
//! - Wire constants (magic numbers, block header flag, header sizes)
//! - Frame parameter enums: [`BlockSizeId`], [`BlockMode`], [`FrameType`]
//! - [`FrameInfo`] (what a header says) and [`Preferences`] (what an encoder
//!   is asked to write)
//! - [`FrameError`] and its conversion to `std::io::Error`

use std::fmt;
use std::io;
use std::str::FromStr;

use thiserror::Error;

use crate::block::{BlockError, ErrorKind};
use crate::config::{
    block_size_id_for, clamp_level, BLOCKSIZEID_DEFAULT, CLEVEL_DEFAULT, CONTENT_CHECKSUM_DEFAULT, LINKED_DEFAULT,
};

// ─────────────────────────────────────────────────────────────────────────────
// Wire constants
// ─────────────────────────────────────────────────────────────────────────────

/// Magic number opening every LZ4 frame (stored little-endian).
pub const LZ4F_MAGICNUMBER: u32 = 0x184D_2204;

/// First of the sixteen skippable-frame magic numbers.
pub const LZ4F_MAGIC_SKIPPABLE_START: u32 = 0x184D_2A50;

/// Mask selecting the fixed bits of a skippable-frame magic number.
pub const LZ4F_MAGIC_SKIPPABLE_MASK: u32 = 0xFFFF_FFF0;

/// Frame format version carried in FLG bits 7-6.
pub const LZ4F_VERSION: u8 = 0b01;

/// High bit of a block header: the payload is stored uncompressed.
pub const LZ4F_BLOCKUNCOMPRESSED_FLAG: u32 = 0x8000_0000;

/// Block header size (payload length + stored flag).
pub const BH_SIZE: usize = 4;

/// Block checksum size, present when block checksums are enabled.
pub const BF_SIZE: usize = 4;

/// Content checksum size, present when the content checksum is enabled.
pub const CONTENT_CHECKSUM_SIZE: usize = 4;

/// Smallest frame header: magic + FLG + BD + HC.
pub const MIN_FH_SIZE: usize = 7;

/// Largest frame header: adds content size and dictionary ID.
pub const MAX_FH_SIZE: usize = 19;

// ─────────────────────────────────────────────────────────────────────────────
// Frame parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum block size, encoded in bits 6-4 of the BD byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum BlockSizeId {
    #[default]
    Max64Kb = 4,
    Max256Kb = 5,
    Max1Mb = 6,
    Max4Mb = 7,
}

impl BlockSizeId {
    /// Parse the 3-bit code stored in the BD byte.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(BlockSizeId::Max64Kb),
            5 => Some(BlockSizeId::Max256Kb),
            6 => Some(BlockSizeId::Max1Mb),
            7 => Some(BlockSizeId::Max4Mb),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Largest plaintext size of one block.
    pub fn max_block_size(self) -> usize {
        1 << (8 + 2 * self.code() as usize)
    }
}

impl FromStr for BlockSizeId {
    type Err = FrameError;

    /// Accepts the numeric ID (`4`-`7`), a size (`64KB`, `256KB`, `1MB`,
    /// `4MB`, case-insensitive) or a byte count of at least 1 KiB, which
    /// selects the smallest class able to hold it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.trim().to_ascii_uppercase().as_str() {
            "4" | "64KB" | "64K" => Some(BlockSizeId::Max64Kb),
            "5" | "256KB" | "256K" => Some(BlockSizeId::Max256Kb),
            "6" | "1MB" | "1M" => Some(BlockSizeId::Max1Mb),
            "7" | "4MB" | "4M" => Some(BlockSizeId::Max4Mb),
            other => other
                .parse::<usize>()
                .ok()
                .filter(|&n| n >= 1024)
                .map(block_size_id_for),
        };
        parsed.ok_or_else(|| {
            FrameError::InvalidOption(format!("block size `{s}` (expected 4-7, 64KB/256KB/1MB/4MB or a byte count)"))
        })
    }
}

impl fmt::Display for BlockSizeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockSizeId::Max64Kb => f.write_str("64KB"),
            BlockSizeId::Max256Kb => f.write_str("256KB"),
            BlockSizeId::Max1Mb => f.write_str("1MB"),
            BlockSizeId::Max4Mb => f.write_str("4MB"),
        }
    }
}

/// Whether blocks may reference data from earlier blocks of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockMode {
    #[default]
    Linked,
    Independent,
}

impl BlockMode {
    pub fn is_linked(self) -> bool {
        self == BlockMode::Linked
    }
}

/// Kind of frame found at the start of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameType {
    #[default]
    Frame,
    SkippableFrame,
}

// ─────────────────────────────────────────────────────────────────────────────
// FrameInfo and Preferences
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters carried by a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    pub frame_type: FrameType,
    pub block_size_id: BlockSizeId,
    pub block_mode: BlockMode,
    pub block_checksum: bool,
    pub content_checksum: bool,
    /// Declared plaintext size, if the header carries one.
    pub content_size: Option<u64>,
    /// Dictionary ID, if the header carries one.
    pub dict_id: Option<u32>,
}

impl FrameInfo {
    /// Bytes the header for these parameters occupies.
    pub fn header_size(&self) -> usize {
        MIN_FH_SIZE
            + if self.content_size.is_some() { 8 } else { 0 }
            + if self.dict_id.is_some() { 4 } else { 0 }
    }
}

/// Frame encoder settings.
///
/// Every field has a usable default and numeric fields are clamped rather
/// than rejected; see [`Preferences::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    /// Compression level, as for the block codec.
    pub level: i32,
    pub block_size: BlockSizeId,
    pub block_mode: BlockMode,
    /// Append an XXH32 of each stored payload after it.
    pub block_checksum: bool,
    /// Append an XXH32 of the whole plaintext after the end mark.
    pub content_checksum: bool,
    /// Plaintext size to declare in the header; checked when the frame ends.
    pub content_size: Option<u64>,
    /// Dictionary ID to advertise in the header.
    pub dict_id: Option<u32>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            level: CLEVEL_DEFAULT,
            block_size: BLOCKSIZEID_DEFAULT,
            block_mode: if LINKED_DEFAULT {
                BlockMode::Linked
            } else {
                BlockMode::Independent
            },
            block_checksum: false,
            content_checksum: CONTENT_CHECKSUM_DEFAULT,
            content_size: None,
            dict_id: None,
        }
    }
}

impl Preferences {
    /// Copy with every numeric field clamped into range.
    pub fn normalized(mut self) -> Self {
        self.level = clamp_level(self.level);
        self
    }

    /// Header parameters these preferences produce.
    pub fn frame_info(&self) -> FrameInfo {
        FrameInfo {
            frame_type: FrameType::Frame,
            block_size_id: self.block_size,
            block_mode: self.block_mode,
            block_checksum: self.block_checksum,
            content_checksum: self.content_checksum,
            content_size: self.content_size,
            dict_id: self.dict_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors produced by the frame encoder and decoder.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("unknown frame magic number {0:#010x}")]
    BadMagic(u32),

    #[error("unsupported frame version {0}")]
    UnsupportedVersion(u8),

    #[error("reserved bit set in frame header")]
    ReservedFlagSet,

    #[error("invalid block size ID {0}")]
    BlockSizeInvalid(u8),

    #[error("header checksum mismatch (stored {stored:#04x}, computed {computed:#04x})")]
    HeaderChecksum { stored: u8, computed: u8 },

    #[error("block checksum mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    BlockChecksum { stored: u32, computed: u32 },

    #[error("content checksum mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    ContentChecksum { stored: u32, computed: u32 },

    #[error("frame declares {declared} bytes of content but holds {actual}")]
    ContentSizeMismatch { declared: u64, actual: u64 },

    #[error("block of {size} bytes exceeds the frame maximum of {max}")]
    BlockTooLarge { size: usize, max: usize },

    #[error("frame is truncated")]
    Truncated,

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("frame encoder is already closed")]
    Closed,

    #[error("frame decoder stopped after an earlier error")]
    Poisoned,

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl FrameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameError::Block(e) => e.kind(),
            FrameError::Io(_) => ErrorKind::Io,
            FrameError::Closed | FrameError::Poisoned | FrameError::InvalidOption(_) => {
                ErrorKind::Usage
            }
            _ => ErrorKind::Format,
        }
    }
}

impl From<FrameError> for io::Error {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Io(inner) => inner,
            FrameError::Truncated => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            other => {
                let kind = match other.kind() {
                    ErrorKind::Usage => io::ErrorKind::InvalidInput,
                    _ => io::ErrorKind::InvalidData,
                };
                io::Error::new(kind, other)
            }
        }
    }
}
