//! LZ4 frame decompression: pull-style [`FrameDecoder`] over any `io::Read`
//! source, plus the one-shot [`decompress_frame`].
//!
//! The decoder parses the header lazily, then decodes one block record at a
//! time into an internal buffer that `read` calls drain. Block and content
//! checksums are verified as they are reached.
//!
//! After an end mark the decoder keeps going: skippable frames are skipped
//! and a following LZ4 frame is decoded as a continuation of the same byte
//! stream. A clean end of input between frames ends the stream.
//!
//! Any error is fatal. The decoder is poisoned and every later call returns
//! [`FrameError::Poisoned`].

use std::io::{self, Read};

use crate::block::BlockDecoderStream;
use crate::displaylevel;
use crate::frame::header::{
    header_size, is_skippable_magic, parse_header, read_le32, HEADER_PREFIX_SIZE,
};
use crate::frame::types::{
    FrameError, FrameInfo, BF_SIZE, BH_SIZE, CONTENT_CHECKSUM_SIZE, LZ4F_BLOCKUNCOMPRESSED_FLAG,
    MAX_FH_SIZE,
};
use crate::xxhash::{content_hasher, xxh32_oneshot, Xxh32State, FRAME_SEED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderStage {
    AwaitingHeader,
    ReadingBlocks,
    Finished,
    Poisoned,
}

/// Streaming LZ4 frame decoder.
pub struct FrameDecoder<R: Read> {
    source: R,
    dictionary: Vec<u8>,
    stage: DecoderStage,
    info: Option<FrameInfo>,
    session: Option<BlockDecoderStream>,
    hasher: Option<Xxh32State>,
    block: Vec<u8>,
    output: Vec<u8>,
    out_pos: usize,
    frame_out: u64,
    frames: u64,
}

impl<R: Read> FrameDecoder<R> {
    pub fn new(source: R) -> Self {
        Self::with_dictionary(source, &[])
    }

    /// Decoder for frames compressed against `dictionary`.
    pub fn with_dictionary(source: R, dictionary: &[u8]) -> Self {
        Self {
            source,
            dictionary: dictionary.to_vec(),
            stage: DecoderStage::AwaitingHeader,
            info: None,
            session: None,
            hasher: None,
            block: Vec::new(),
            output: Vec::new(),
            out_pos: 0,
            frame_out: 0,
            frames: 0,
        }
    }

    /// Header parameters of the current frame, reading the header if it has
    /// not been reached yet.
    pub fn frame_info(&mut self) -> Result<FrameInfo, FrameError> {
        if self.info.is_none() {
            self.guard(|d| {
                if d.read_header()? {
                    Ok(())
                } else {
                    Err(FrameError::Truncated)
                }
            })?;
        }
        self.info.ok_or(FrameError::Truncated)
    }

    /// Read up to `n` plaintext bytes, or everything that remains when `n`
    /// is `None`.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. `Some(0)` always
    /// yields an empty vector.
    pub fn read(&mut self, n: Option<usize>) -> Result<Option<Vec<u8>>, FrameError> {
        if n == Some(0) {
            self.check_poisoned()?;
            return Ok(Some(Vec::new()));
        }
        let mut out = Vec::new();
        if self.read_into(n, &mut out)? == 0 {
            return Ok(None);
        }
        Ok(Some(out))
    }

    /// Like [`read`](Self::read) but appends to `dest`; returns the number
    /// of bytes appended (0 at end of stream).
    pub fn read_into(&mut self, n: Option<usize>, dest: &mut Vec<u8>) -> Result<usize, FrameError> {
        self.check_poisoned()?;
        let want = n.unwrap_or(usize::MAX);
        let mut produced = 0;
        while produced < want {
            let available = self.output.len() - self.out_pos;
            if available == 0 {
                if !self.next_chunk()? {
                    break;
                }
                continue;
            }
            let take = available.min(want - produced);
            dest.extend_from_slice(&self.output[self.out_pos..self.out_pos + take]);
            self.out_pos += take;
            produced += take;
        }
        Ok(produced)
    }

    /// Whether the stream is exhausted. May read ahead from the source.
    pub fn eof(&mut self) -> Result<bool, FrameError> {
        self.check_poisoned()?;
        if self.out_pos < self.output.len() {
            return Ok(false);
        }
        Ok(!self.next_chunk()?)
    }

    /// Completed LZ4 frames so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn check_poisoned(&self) -> Result<(), FrameError> {
        if self.stage == DecoderStage::Poisoned {
            Err(FrameError::Poisoned)
        } else {
            Ok(())
        }
    }

    fn guard<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, FrameError>,
    ) -> Result<T, FrameError> {
        self.check_poisoned()?;
        let result = f(self);
        if result.is_err() {
            self.stage = DecoderStage::Poisoned;
        }
        result
    }

    /// Decode until new output is buffered (`true`) or the stream ends
    /// cleanly (`false`).
    fn next_chunk(&mut self) -> Result<bool, FrameError> {
        self.guard(|d| {
            d.output.clear();
            d.out_pos = 0;
            loop {
                match d.stage {
                    DecoderStage::AwaitingHeader => {
                        if !d.read_header()? {
                            return Ok(false);
                        }
                    }
                    DecoderStage::ReadingBlocks => {
                        d.read_block()?;
                        if !d.output.is_empty() {
                            return Ok(true);
                        }
                    }
                    DecoderStage::Finished => d.stage = DecoderStage::AwaitingHeader,
                    DecoderStage::Poisoned => return Err(FrameError::Poisoned),
                }
            }
        })
    }

    /// Parse the next LZ4 frame header, skipping skippable frames. Returns
    /// `false` on a clean end of input after at least one frame.
    fn read_header(&mut self) -> Result<bool, FrameError> {
        let mut header = [0u8; MAX_FH_SIZE];
        loop {
            if !read_or_eof(&mut self.source, &mut header[..4])? {
                if self.frames == 0 {
                    return Err(FrameError::Truncated);
                }
                return Ok(false);
            }
            let magic = read_le32(&header, 0);
            if is_skippable_magic(magic) {
                let mut size = [0u8; 4];
                read_exact(&mut self.source, &mut size)?;
                let size = u32::from_le_bytes(size) as u64;
                let skipped = io::copy(&mut (&mut self.source).take(size), &mut io::sink())?;
                if skipped != size {
                    return Err(FrameError::Truncated);
                }
                displaylevel!(4, "frame: skipped {} bytes of skippable frame\n", size);
                continue;
            }

            read_exact(&mut self.source, &mut header[4..HEADER_PREFIX_SIZE])?;
            let size = header_size(&header[..HEADER_PREFIX_SIZE])?;
            read_exact(&mut self.source, &mut header[HEADER_PREFIX_SIZE..size])?;
            let info = parse_header(&header[..size])?;
            displaylevel!(
                4,
                "frame: blocks {} {:?}, block checksum {}, content checksum {}, size {:?}\n",
                info.block_size_id,
                info.block_mode,
                info.block_checksum,
                info.content_checksum,
                info.content_size
            );

            self.session = Some(BlockDecoderStream::with_dictionary(
                info.block_mode.is_linked(),
                &self.dictionary,
            ));
            self.hasher = info.content_checksum.then(content_hasher);
            self.info = Some(info);
            self.frame_out = 0;
            self.stage = DecoderStage::ReadingBlocks;
            return Ok(true);
        }
    }

    /// Consume one block record (or the end mark and trailer).
    fn read_block(&mut self) -> Result<(), FrameError> {
        let info = self.info.ok_or(FrameError::Truncated)?;
        let mut word = [0u8; BH_SIZE];
        read_exact(&mut self.source, &mut word)?;
        let word = u32::from_le_bytes(word);

        if word == 0 {
            return self.finish_frame(&info);
        }

        let stored = word & LZ4F_BLOCKUNCOMPRESSED_FLAG != 0;
        let size = (word & !LZ4F_BLOCKUNCOMPRESSED_FLAG) as usize;
        let max = info.block_size_id.max_block_size();
        if size > max {
            return Err(FrameError::BlockTooLarge { size, max });
        }
        self.block.resize(size, 0);
        read_exact(&mut self.source, &mut self.block)?;

        if info.block_checksum {
            let mut checksum = [0u8; BF_SIZE];
            read_exact(&mut self.source, &mut checksum)?;
            let stored_sum = u32::from_le_bytes(checksum);
            let computed = xxh32_oneshot(&self.block, FRAME_SEED);
            if stored_sum != computed {
                return Err(FrameError::BlockChecksum {
                    stored: stored_sum,
                    computed,
                });
            }
        }

        let session = self.session.as_mut().ok_or(FrameError::Truncated)?;
        let start = self.output.len();
        if stored {
            session.push_raw(&self.block, &mut self.output);
        } else {
            session.decode(&self.block, &mut self.output, Some(max))?;
        }
        let plain = &self.output[start..];
        if let Some(hasher) = &mut self.hasher {
            hasher.update(plain);
        }
        self.frame_out += plain.len() as u64;
        displaylevel!(
            5,
            "frame: block {} bytes{} -> {} bytes\n",
            size,
            if stored { " (stored)" } else { "" },
            plain.len()
        );
        Ok(())
    }

    fn finish_frame(&mut self, info: &FrameInfo) -> Result<(), FrameError> {
        if let Some(hasher) = self.hasher.take() {
            let mut checksum = [0u8; CONTENT_CHECKSUM_SIZE];
            read_exact(&mut self.source, &mut checksum)?;
            let stored = u32::from_le_bytes(checksum);
            let computed = hasher.digest();
            if stored != computed {
                return Err(FrameError::ContentChecksum { stored, computed });
            }
        }
        if let Some(declared) = info.content_size {
            if declared != self.frame_out {
                return Err(FrameError::ContentSizeMismatch {
                    declared,
                    actual: self.frame_out,
                });
            }
        }
        self.frames += 1;
        self.session = None;
        self.stage = DecoderStage::Finished;
        displaylevel!(4, "frame: end mark after {} bytes\n", self.frame_out);
        Ok(())
    }
}

impl<R: Read> Read for FrameDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.check_poisoned()?;
        while self.out_pos == self.output.len() {
            if !self.next_chunk()? {
                return Ok(0);
            }
        }
        let n = buf.len().min(self.output.len() - self.out_pos);
        buf[..n].copy_from_slice(&self.output[self.out_pos..self.out_pos + n]);
        self.out_pos += n;
        Ok(n)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Source helpers
// ─────────────────────────────────────────────────────────────────────────────

fn read_exact<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<(), FrameError> {
    source.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => FrameError::Truncated,
        _ => FrameError::Io(e),
    })
}

/// Fill `buf` completely, or return `false` if the source is already at
/// its end. A partial fill is a truncation.
fn read_or_eof<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<bool, FrameError> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(FrameError::Truncated),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(FrameError::Io(e)),
        }
    }
    Ok(true)
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot API
// ─────────────────────────────────────────────────────────────────────────────

/// Decompress every frame in `src`, appending the plaintext to `dest`.
///
/// `size_hint` presizes `dest`; it is not a cap. On failure `dest` is
/// truncated back to its length on entry.
pub fn decompress_frame<'d>(
    src: &[u8],
    size_hint: Option<usize>,
    dest: &'d mut Vec<u8>,
) -> Result<&'d mut Vec<u8>, FrameError> {
    let entry = dest.len();
    if let Some(hint) = size_hint {
        dest.reserve(hint.min(src.len().saturating_mul(255)));
    }
    let mut decoder = FrameDecoder::new(src);
    if let Err(e) = decoder.read_into(None, dest) {
        dest.truncate(entry);
        return Err(e);
    }
    Ok(dest)
}

/// [`decompress_frame`] into a fresh vector.
pub fn decompress_frame_to_vec(src: &[u8]) -> Result<Vec<u8>, FrameError> {
    let mut out = Vec::new();
    decompress_frame(src, None, &mut out)?;
    Ok(out)
}
