// Frame encoder → decoder over irregular write and read sizes, through the
// push/pull API and through std::io.

use std::io::{self, Read, Write};

use lz4_codec::frame::{
    compress_frame, compress_frame_bound, compress_frame_to_vec, decompress_frame,
    decompress_frame_to_vec, BlockMode, BlockSizeId, FrameDecoder, FrameEncoder, Preferences,
};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Compressible but irregular: words drawn by a xorshift generator, with an
/// occasional run of raw noise.
fn payload(len: usize) -> Vec<u8> {
    let words: [&[u8]; 8] = [
        b"frame ", b"block ", b"window ", b"literal ", b"match ", b"offset ", b"token ", b"\n",
    ];
    let mut x: u32 = 0x1234_5678;
    let mut out = Vec::with_capacity(len + 64);
    while out.len() < len {
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        if x % 97 == 0 {
            out.extend((0..48).map(|i| (x >> (i % 24)) as u8));
        } else {
            out.extend_from_slice(words[(x % 8) as usize]);
        }
    }
    out.truncate(len);
    out
}

const WRITE_SIZES: [usize; 7] = [1, 7, 1000, 65_535, 65_537, 300_000, 13];
const READ_SIZES: [usize; 6] = [3, 65_536, 1, 100_000, 4_097, 777];

fn encode_in_chunks(data: &[u8], prefs: Preferences) -> Vec<u8> {
    let mut enc = FrameEncoder::new(Vec::new(), prefs).unwrap();
    let mut pos = 0;
    let mut i = 0;
    while pos < data.len() {
        let n = WRITE_SIZES[i % WRITE_SIZES.len()].min(data.len() - pos);
        enc.write(&data[pos..pos + n]).unwrap();
        pos += n;
        i += 1;
    }
    enc.finish().unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Streaming scenario
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn multi_megabyte_irregular_chunks() {
    let data = payload(3 * 1024 * 1024 + 12_345);
    let frame = encode_in_chunks(&data, Preferences::default());
    assert!(frame.len() < data.len());
    assert!(frame.len() <= compress_frame_bound(data.len(), &Preferences::default()));

    let mut dec = FrameDecoder::new(&frame[..]);
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while out.len() < data.len() / 2 {
        let chunk = dec.read(Some(READ_SIZES[i % READ_SIZES.len()])).unwrap().unwrap();
        assert!(!chunk.is_empty());
        assert!(chunk.len() <= READ_SIZES[i % READ_SIZES.len()]);
        out.extend_from_slice(&chunk);
        i += 1;
    }
    // Everything else in one unbounded read.
    out.extend_from_slice(&dec.read(None).unwrap().unwrap());
    assert_eq!(out.len(), data.len());
    assert!(out == data);
    assert_eq!(dec.read(None).unwrap(), None);
    assert_eq!(dec.read(Some(10)).unwrap(), None);
    assert!(dec.eof().unwrap());
    assert_eq!(dec.frames(), 1);
}

#[test]
fn every_option_combination_round_trips() {
    let data = payload(600_000);
    for block_size in [BlockSizeId::Max64Kb, BlockSizeId::Max256Kb, BlockSizeId::Max4Mb] {
        for block_mode in [BlockMode::Linked, BlockMode::Independent] {
            for (block_checksum, content_checksum) in [(false, false), (true, true), (true, false)] {
                let prefs = Preferences {
                    level: if block_checksum { 3 } else { -2 },
                    block_size,
                    block_mode,
                    block_checksum,
                    content_checksum,
                    ..Preferences::default()
                };
                let frame = encode_in_chunks(&data, prefs);
                let back = decompress_frame_to_vec(&frame).unwrap();
                assert!(back == data, "{prefs:?}");
            }
        }
    }
}

#[test]
fn decoder_reports_header_parameters() {
    let prefs = Preferences {
        block_size: BlockSizeId::Max1Mb,
        block_mode: BlockMode::Independent,
        content_checksum: true,
        content_size: Some(5000),
        dict_id: Some(77),
        ..Preferences::default()
    };
    let frame = compress_frame_to_vec(&payload(5000), &prefs).unwrap();
    let mut dec = FrameDecoder::new(&frame[..]);
    let info = dec.frame_info().unwrap();
    assert_eq!(info.block_size_id, BlockSizeId::Max1Mb);
    assert_eq!(info.block_mode, BlockMode::Independent);
    assert!(info.content_checksum);
    assert!(!info.block_checksum);
    assert_eq!(info.content_size, Some(5000));
    assert_eq!(info.dict_id, Some(77));
    assert_eq!(dec.read(None).unwrap().unwrap().len(), 5000);
}

#[test]
fn flush_emits_a_short_block_without_ending_the_frame() {
    let mut enc = FrameEncoder::new(Vec::new(), Preferences::default()).unwrap();
    enc.write(b"first part, ").unwrap().flush().unwrap();
    let mid = enc.get_ref().len();

    // What is already in the sink decodes, but the frame is not finished.
    let mut partial = FrameDecoder::new(&enc.get_ref()[..]);
    assert_eq!(partial.read(Some(12)).unwrap().unwrap(), b"first part, ");
    assert!(partial.read(None).is_err());

    enc.write(b"second part").unwrap();
    let frame = enc.finish().unwrap();
    assert!(frame.len() > mid);
    assert_eq!(decompress_frame_to_vec(&frame).unwrap(), b"first part, second part");
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot helpers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn one_shot_helpers_append_in_place() {
    let data = payload(100_000);
    let mut frame = b"xx".to_vec();
    let ptr = &frame as *const Vec<u8>;
    let returned = compress_frame(&data, &Preferences::default(), &mut frame).unwrap();
    assert!(std::ptr::eq(returned, ptr));
    assert_eq!(&frame[..2], b"xx");

    let mut plain = b"yy".to_vec();
    decompress_frame(&frame[2..], Some(data.len()), &mut plain).unwrap();
    assert_eq!(&plain[..2], b"yy");
    assert!(plain[2..] == data[..]);
}

#[test]
fn empty_payload_frame() {
    let frame = compress_frame_to_vec(b"", &Preferences::default()).unwrap();
    let mut dec = FrameDecoder::new(&frame[..]);
    assert_eq!(dec.read(None).unwrap(), None);
    assert!(dec.eof().unwrap());
    assert_eq!(dec.frames(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// std::io integration
// ─────────────────────────────────────────────────────────────────────────────

/// Sink that accepts at most `max` bytes per call.
struct Trickle {
    inner: Vec<u8>,
    max: usize,
}

impl Write for Trickle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.max);
        self.inner.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Source that returns at most `max` bytes per call.
struct Drip<'a> {
    data: &'a [u8],
    max: usize,
}

impl Read for Drip<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.max).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn io_traits_with_short_reads_and_writes() {
    let data = payload(400_000);
    let prefs = Preferences {
        content_checksum: true,
        block_checksum: true,
        ..Preferences::default()
    };
    let sink = Trickle {
        inner: Vec::new(),
        max: 5,
    };
    let mut enc = FrameEncoder::new(sink, prefs).unwrap();
    io::copy(&mut &data[..], &mut enc).unwrap();
    let frame = enc.finish().unwrap().inner;

    let mut dec = FrameDecoder::new(Drip {
        data: &frame,
        max: 3,
    });
    let mut out = Vec::new();
    dec.read_to_end(&mut out).unwrap();
    assert!(out == data);
}
