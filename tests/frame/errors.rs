// Frame decoder failure modes: each corruption maps to its own error, the
// decoder is poisoned afterwards, and std::io callers see a sensible kind.

use std::io::{self, Read};

use lz4_codec::frame::{
    compress_frame_to_vec, decompress_frame, decompress_frame_to_vec, FrameDecoder, FrameEncoder,
    FrameError, Preferences,
};
use lz4_codec::ErrorKind;

const HEADER_LEN: usize = 7;

fn data() -> Vec<u8> {
    b"checksums catch corruption; truncation is reported separately. "
        .repeat(300)
}

fn checked_frame() -> Vec<u8> {
    let prefs = Preferences {
        block_checksum: true,
        content_checksum: true,
        ..Preferences::default()
    };
    compress_frame_to_vec(&data(), &prefs).unwrap()
}

#[test]
fn bad_magic() {
    let mut frame = checked_frame();
    frame[0] = 0x05;
    let err = decompress_frame_to_vec(&frame).unwrap_err();
    assert!(matches!(err, FrameError::BadMagic(0x184D_2205)));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn header_checksum_mismatch() {
    let mut frame = checked_frame();
    frame[HEADER_LEN - 1] ^= 0x55;
    let err = decompress_frame_to_vec(&frame).unwrap_err();
    assert!(matches!(err, FrameError::HeaderChecksum { .. }));
}

#[test]
fn block_checksum_mismatch() {
    let mut frame = checked_frame();
    // First byte of the first block payload.
    frame[HEADER_LEN + 4] ^= 0x01;
    let err = decompress_frame_to_vec(&frame).unwrap_err();
    assert!(matches!(err, FrameError::BlockChecksum { .. }), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn content_checksum_mismatch() {
    let mut frame = checked_frame();
    let last = frame.len() - 1;
    frame[last] ^= 0x80;
    let err = decompress_frame_to_vec(&frame).unwrap_err();
    assert!(matches!(err, FrameError::ContentChecksum { .. }), "{err:?}");
}

#[test]
fn truncation_is_distinct_from_corruption() {
    let frame = checked_frame();
    for cut in [0, 3, HEADER_LEN, HEADER_LEN + 2, frame.len() / 2, frame.len() - 4, frame.len() - 1] {
        let err = decompress_frame_to_vec(&frame[..cut]).unwrap_err();
        assert!(matches!(err, FrameError::Truncated), "cut {cut}: {err:?}");
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}

#[test]
fn oversized_block_header() {
    let mut frame = compress_frame_to_vec(b"tiny", &Preferences::default()).unwrap();
    let size = (64 * 1024 + 1) as u32;
    frame[HEADER_LEN..HEADER_LEN + 4].copy_from_slice(&size.to_le_bytes());
    let err = decompress_frame_to_vec(&frame).unwrap_err();
    assert!(matches!(err, FrameError::BlockTooLarge { size: 65_537, max: 65_536 }));
}

#[test]
fn corrupt_compressed_block_without_checksums() {
    let data = data();
    let mut frame = compress_frame_to_vec(&data, &Preferences::default()).unwrap();
    // Replace the block payload with a match at offset 0.
    let header = u32::from_le_bytes(frame[HEADER_LEN..HEADER_LEN + 4].try_into().unwrap());
    assert_eq!(header & 0x8000_0000, 0);
    frame[HEADER_LEN + 4] = 0x00;
    frame[HEADER_LEN + 5] = 0x00;
    frame[HEADER_LEN + 6] = 0x00;
    let err = decompress_frame_to_vec(&frame).unwrap_err();
    assert!(matches!(err, FrameError::Block(_)), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Codec);
}

#[test]
fn decoder_is_poisoned_after_failure() {
    let mut frame = checked_frame();
    frame[HEADER_LEN + 4] ^= 0x01;
    let mut dec = FrameDecoder::new(&frame[..]);
    assert!(matches!(dec.read(None), Err(FrameError::BlockChecksum { .. })));
    assert!(matches!(dec.read(Some(1)), Err(FrameError::Poisoned)));
    assert!(matches!(dec.read(Some(0)), Err(FrameError::Poisoned)));
    assert!(matches!(dec.eof(), Err(FrameError::Poisoned)));
}

#[test]
fn failed_one_shot_leaves_destination_alone() {
    let frame = checked_frame();
    let mut dest = b"previous".to_vec();
    assert!(decompress_frame(&frame[..frame.len() - 1], None, &mut dest).is_err());
    assert_eq!(dest, b"previous");
}

#[test]
fn empty_source_is_truncated() {
    let mut dec = FrameDecoder::new(&[][..]);
    assert!(matches!(dec.read(None), Err(FrameError::Truncated)));
}

#[test]
fn io_error_kinds() {
    let frame = checked_frame();
    let mut out = Vec::new();

    let err = FrameDecoder::new(&frame[..frame.len() - 2])
        .read_to_end(&mut out)
        .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

    let mut bad = frame.clone();
    bad[HEADER_LEN + 4] ^= 0x01;
    out.clear();
    let err = FrameDecoder::new(&bad[..]).read_to_end(&mut out).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn closed_encoder_rejects_writes() {
    let mut enc = FrameEncoder::new(Vec::new(), Preferences::default()).unwrap();
    enc.close().unwrap();
    let err = enc.write(b"late").unwrap_err();
    assert!(matches!(err, FrameError::Closed));
    assert_eq!(err.kind(), ErrorKind::Usage);
}
