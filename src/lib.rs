//! LZ4 compression: a byte-compatible block codec, linked streaming block
//! sessions, and the LZ4 frame format with push-style encoding and
//! pull-style decoding.
//!
//! ```
//! use lz4_codec::{compress_frame_to_vec, decompress_frame_to_vec, Preferences};
//!
//! let data = b"hello hello hello hello hello";
//! let frame = compress_frame_to_vec(data, &Preferences::default()).unwrap();
//! assert_eq!(decompress_frame_to_vec(&frame).unwrap(), data);
//! ```

pub mod block;
pub mod cli;
pub mod config;
pub mod display;
pub mod frame;
pub mod xxhash;

/// Version of this crate, as reported by the `lz4` binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use block::{
    decode, decode_size, decode_to_vec, encode, encode_size, encode_to_vec, BlockDecoderStream,
    BlockEncoderStream, BlockError, DecodeOptions, EncodeOptions, ErrorKind,
};
pub use frame::{
    compress_frame, compress_frame_bound, compress_frame_to_vec, decompress_frame,
    decompress_frame_to_vec, BlockMode, BlockSizeId, FrameDecoder, FrameEncoder, FrameError,
    FrameInfo, Preferences,
};
