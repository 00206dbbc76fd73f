//! LZ4 block compression and decompression.
//!
//! A block is a bare token stream with no header: the caller must carry its
//! length (and, for decoding, any dictionary) out of band. [`codec`] holds
//! the one-shot API; [`stream`] holds sessions that keep a 64 KiB history
//! across calls for linked blocks.

pub mod codec;
pub mod compress;
pub mod decompress;
pub mod hc;
pub mod stream;
pub mod types;
pub mod window;

pub use codec::{
    decode, decode_size, decode_to_vec, encode, encode_size, encode_to_vec, DecodeOptions,
    EncodeOptions,
};
pub use stream::{BlockDecoderStream, BlockEncoderStream, SessionState};
pub use types::{BlockError, ErrorKind, LZ4_DISTANCE_MAX, LZ4_MAX_INPUT_SIZE, WINDOW_SIZE};
pub use window::Window;
