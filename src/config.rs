// config.rs — Defaults and per-field clamping for codec options.
//
// Every numeric option accepted by the codec is clamped into its valid
// range here, once, before any compression work starts. Out-of-range values
// are never an error.

use crate::frame::types::BlockSizeId;

// Default compression level: the fast matcher with acceleration 1.
// The `lz4` binary lets the LZ4_CLEVEL environment variable override it.
pub const CLEVEL_DEFAULT: i32 = 0;

// Lowest level that selects the hash-chain matcher.
pub const CLEVEL_CHAIN_MIN: i32 = 2;

// Highest hash-chain level; larger values are clamped down to it.
pub const CLEVEL_MAX: i32 = 12;

// Acceleration bounds for the fast matcher.
pub const ACCELERATION_DEFAULT: u32 = 1;
pub const ACCELERATION_MAX: u32 = 65_537;

// Default frame block size (ID 4 = 64 KiB).
pub const BLOCKSIZEID_DEFAULT: BlockSizeId = BlockSizeId::Max64Kb;

// Frames link their blocks unless told otherwise.
pub const LINKED_DEFAULT: bool = true;

// Content checksum is opt-in.
pub const CONTENT_CHECKSUM_DEFAULT: bool = false;

// Chain-walk depth per hash-chain level, indexed by level (0 and 1 unused).
const CHAIN_ATTEMPTS: [u32; (CLEVEL_MAX + 1) as usize] =
    [2, 2, 2, 4, 8, 16, 32, 64, 128, 256, 512, 2048, 16_384];

/// Match-finding strategy derived from a compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Single-probe hash table; larger `acceleration` skips faster over
    /// incompressible regions.
    Fast { acceleration: u32 },
    /// Hash chains walked up to `max_attempts` candidates per position.
    Chain { max_attempts: u32 },
}

/// Clamp a requested acceleration into `1..=ACCELERATION_MAX`.
#[inline]
pub fn clamp_acceleration(acceleration: i64) -> u32 {
    acceleration.clamp(ACCELERATION_DEFAULT as i64, ACCELERATION_MAX as i64) as u32
}

/// Clamp a level into `-ACCELERATION_MAX..=CLEVEL_MAX`.
#[inline]
pub fn clamp_level(level: i32) -> i32 {
    level.clamp(-(ACCELERATION_MAX as i32), CLEVEL_MAX)
}

/// Clamp a hash-chain level into `CLEVEL_CHAIN_MIN..=CLEVEL_MAX`.
#[inline]
pub fn clamp_hc_level(level: i32) -> i32 {
    level.clamp(CLEVEL_CHAIN_MIN, CLEVEL_MAX)
}

/// Map any integer level onto a matcher.
///
/// `level <= 1` uses the fast matcher with acceleration `max(1, -level)`;
/// `level >= 2` uses hash chains, clamped at [`CLEVEL_MAX`].
pub fn strategy_for_level(level: i32) -> Strategy {
    if level < CLEVEL_CHAIN_MIN {
        Strategy::Fast {
            acceleration: clamp_acceleration(-(level as i64)),
        }
    } else {
        Strategy::Chain {
            max_attempts: CHAIN_ATTEMPTS[clamp_hc_level(level) as usize],
        }
    }
}

/// Smallest block size ID able to hold `bytes`; `0` selects the default.
///
/// Anything above 1 MiB maps to the 4 MiB class.
pub fn block_size_id_for(bytes: usize) -> BlockSizeId {
    match bytes {
        0 => BLOCKSIZEID_DEFAULT,
        n if n <= 64 << 10 => BlockSizeId::Max64Kb,
        n if n <= 256 << 10 => BlockSizeId::Max256Kb,
        n if n <= 1 << 20 => BlockSizeId::Max1Mb,
        _ => BlockSizeId::Max4Mb,
    }
}
