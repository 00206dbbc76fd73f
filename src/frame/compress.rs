//! LZ4 frame compression: push-style [`FrameEncoder`] over any `io::Write`
//! sink, plus the one-shot [`compress_frame`].
//!
//! The encoder writes the frame header as soon as it is created. Written
//! bytes are buffered until a full block (the frame's block max size) is
//! available; each full block is compressed and sent to the sink as one
//! block record. [`FrameEncoder::close`] emits the final partial block, the
//! end mark and the optional content checksum.
//!
//! A block whose compressed form is not smaller than its plaintext is stored
//! raw with [`LZ4F_BLOCKUNCOMPRESSED_FLAG`] set.
//!
//! Dropping an encoder does not close the frame: bytes still buffered are
//! lost and the sink holds an unterminated frame.

use std::io::{self, Write};

use crate::block::BlockEncoderStream;
use crate::displaylevel;
use crate::frame::header::{block_payload_bound, compress_frame_bound, write_header};
use crate::frame::types::{FrameError, Preferences, BH_SIZE, LZ4F_BLOCKUNCOMPRESSED_FLAG};
use crate::xxhash::{content_hasher, xxh32_oneshot, Xxh32State, FRAME_SEED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncoderStage {
    Writing,
    Closed,
}

/// Streaming LZ4 frame encoder.
pub struct FrameEncoder<W: Write> {
    sink: W,
    prefs: Preferences,
    block_size: usize,
    session: BlockEncoderStream,
    pending: Vec<u8>,
    record: Vec<u8>,
    hasher: Option<Xxh32State>,
    total_in: u64,
    stage: EncoderStage,
}

impl<W: Write + std::fmt::Debug> std::fmt::Debug for FrameEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameEncoder")
            .field("sink", &self.sink)
            .field("prefs", &self.prefs)
            .field("block_size", &self.block_size)
            .field("total_in", &self.total_in)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

impl<W: Write> FrameEncoder<W> {
    /// Start a frame on `sink`; the header is written before this returns.
    pub fn new(sink: W, prefs: Preferences) -> Result<Self, FrameError> {
        Self::with_dictionary(sink, prefs, &[])
    }

    /// Start a frame whose blocks may reference `dictionary`. The decoder
    /// needs the same bytes; `prefs.dict_id` can advertise which ones.
    pub fn with_dictionary(
        mut sink: W,
        prefs: Preferences,
        dictionary: &[u8],
    ) -> Result<Self, FrameError> {
        let prefs = prefs.normalized();
        let info = prefs.frame_info();
        let mut header = Vec::with_capacity(info.header_size());
        write_header(&info, &mut header);
        sink.write_all(&header)?;
        displaylevel!(
            4,
            "frame: level {}, blocks {} {:?}, block checksum {}, content checksum {}\n",
            prefs.level,
            prefs.block_size,
            prefs.block_mode,
            prefs.block_checksum,
            prefs.content_checksum
        );

        let block_size = prefs.block_size.max_block_size();
        Ok(Self {
            sink,
            prefs,
            block_size,
            session: BlockEncoderStream::with_dictionary(
                prefs.level,
                prefs.block_mode.is_linked(),
                dictionary,
            ),
            pending: Vec::with_capacity(block_size),
            record: Vec::with_capacity(BH_SIZE + block_payload_bound(block_size) + 4),
            hasher: prefs.content_checksum.then(content_hasher),
            total_in: 0,
            stage: EncoderStage::Writing,
        })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Plaintext bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    pub fn is_closed(&self) -> bool {
        self.stage == EncoderStage::Closed
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Accept `data`, emitting every block that becomes full.
    pub fn write(&mut self, data: &[u8]) -> Result<&mut Self, FrameError> {
        self.push(data)?;
        Ok(self)
    }

    /// Emit buffered bytes as a (possibly short) block and flush the sink.
    /// The frame stays open.
    pub fn flush(&mut self) -> Result<&mut Self, FrameError> {
        self.ensure_open()?;
        self.emit_pending()?;
        self.sink.flush()?;
        Ok(self)
    }

    /// End the frame: last block, end mark, then the content checksum if
    /// enabled. Later writes fail with [`FrameError::Closed`].
    pub fn close(&mut self) -> Result<(), FrameError> {
        self.ensure_open()?;
        self.emit_pending()?;
        self.stage = EncoderStage::Closed;

        if let Some(declared) = self.prefs.content_size {
            if declared != self.total_in {
                return Err(FrameError::ContentSizeMismatch {
                    declared,
                    actual: self.total_in,
                });
            }
        }

        self.sink.write_all(&0u32.to_le_bytes())?;
        if let Some(hasher) = &self.hasher {
            let checksum = hasher.digest();
            self.sink.write_all(&checksum.to_le_bytes())?;
            displaylevel!(5, "frame: content checksum {:08x}\n", checksum);
        }
        self.sink.flush()?;
        displaylevel!(4, "frame: closed after {} bytes\n", self.total_in);
        Ok(())
    }

    /// Close the frame if still open and hand back the sink.
    pub fn finish(mut self) -> Result<W, FrameError> {
        if !self.is_closed() {
            self.close()?;
        }
        Ok(self.sink)
    }

    fn ensure_open(&self) -> Result<(), FrameError> {
        match self.stage {
            EncoderStage::Writing => Ok(()),
            EncoderStage::Closed => Err(FrameError::Closed),
        }
    }

    fn push(&mut self, mut data: &[u8]) -> Result<(), FrameError> {
        self.ensure_open()?;
        if let Some(hasher) = &mut self.hasher {
            hasher.update(data);
        }
        self.total_in += data.len() as u64;

        while !data.is_empty() {
            if self.pending.is_empty() && data.len() >= self.block_size {
                let (block, rest) = data.split_at(self.block_size);
                self.emit_block(block)?;
                data = rest;
                continue;
            }
            let take = (self.block_size - self.pending.len()).min(data.len());
            self.pending.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.pending.len() == self.block_size {
                self.emit_pending()?;
            }
        }
        Ok(())
    }

    fn emit_pending(&mut self) -> Result<(), FrameError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.pending);
        let result = self.emit_block(&pending);
        self.pending = pending;
        self.pending.clear();
        result
    }

    fn emit_block(&mut self, block: &[u8]) -> Result<(), FrameError> {
        self.record.clear();
        self.record.extend_from_slice(&[0u8; BH_SIZE]);
        let compressed = self.session.encode(block, &mut self.record)?;

        let header = if compressed >= block.len() {
            self.record.truncate(BH_SIZE);
            self.record.extend_from_slice(block);
            displaylevel!(5, "frame: block {} bytes stored raw\n", block.len());
            block.len() as u32 | LZ4F_BLOCKUNCOMPRESSED_FLAG
        } else {
            displaylevel!(5, "frame: block {} -> {} bytes\n", block.len(), compressed);
            compressed as u32
        };
        self.record[..BH_SIZE].copy_from_slice(&header.to_le_bytes());

        if self.prefs.block_checksum {
            let checksum = xxh32_oneshot(&self.record[BH_SIZE..], FRAME_SEED);
            self.record.extend_from_slice(&checksum.to_le_bytes());
        }
        self.sink.write_all(&self.record)?;
        Ok(())
    }
}

impl<W: Write> Write for FrameEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.push(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        FrameEncoder::flush(self)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot API
// ─────────────────────────────────────────────────────────────────────────────

/// Compress `src` as one complete frame appended to `dest`.
///
/// On failure `dest` is truncated back to its length on entry.
pub fn compress_frame<'d>(
    src: &[u8],
    prefs: &Preferences,
    dest: &'d mut Vec<u8>,
) -> Result<&'d mut Vec<u8>, FrameError> {
    let entry = dest.len();
    dest.reserve(compress_frame_bound(src.len(), prefs));
    if let Err(e) = write_frame(src, prefs, dest) {
        dest.truncate(entry);
        return Err(e);
    }
    Ok(dest)
}

/// [`compress_frame`] into a fresh vector.
pub fn compress_frame_to_vec(src: &[u8], prefs: &Preferences) -> Result<Vec<u8>, FrameError> {
    let mut out = Vec::new();
    compress_frame(src, prefs, &mut out)?;
    Ok(out)
}

fn write_frame(src: &[u8], prefs: &Preferences, sink: &mut Vec<u8>) -> Result<(), FrameError> {
    let mut encoder = FrameEncoder::new(sink, *prefs)?;
    encoder.write(src)?;
    encoder.close()
}
