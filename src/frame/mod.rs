//! LZ4 frame format: streaming compression and decompression.
//!
//! A frame wraps a sequence of blocks with a header, per-block size
//! prefixes, an end mark and optional XXH32 checksums, so it can be decoded
//! without out-of-band information.

pub mod compress;
pub mod decompress;
pub mod header;
pub mod types;

pub use compress::{compress_frame, compress_frame_to_vec, FrameEncoder};
pub use decompress::{decompress_frame, decompress_frame_to_vec, FrameDecoder};
pub use header::compress_frame_bound;
pub use types::{BlockMode, BlockSizeId, FrameError, FrameInfo, FrameType, Preferences};
