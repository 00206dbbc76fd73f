//! XXH32 helpers used by the frame layer.
//!
//! The frame format uses XXH32 with seed 0 for three things: the one-byte
//! header checksum, the optional per-block checksum and the optional content
//! checksum. The hashing itself comes from `xxhash-rust`.

pub use xxhash_rust::xxh32::Xxh32 as Xxh32State;

/// Seed used by every checksum in the LZ4 frame format.
pub const FRAME_SEED: u32 = 0;

/// One-shot XXH32.
///
/// `xxh32_oneshot(b"", 0) == 0x02CC5D05`.
#[inline]
pub fn xxh32_oneshot(data: &[u8], seed: u32) -> u32 {
    xxhash_rust::xxh32::xxh32(data, seed)
}

/// Fresh streaming state seeded for frame content checksums.
#[inline]
pub fn content_hasher() -> Xxh32State {
    Xxh32State::new(FRAME_SEED)
}
