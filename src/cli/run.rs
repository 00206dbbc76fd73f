//! Execution of a resolved [`Job`]: open endpoints, stream through the
//! frame codec (or the bare block codec), report a summary.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Write};
use std::path::Path;

use anyhow::{bail, Context};

use crate::block::{self, DecodeOptions, EncodeOptions};
use crate::cli::args::Job;
use crate::cli::constants::{is_stdout, COMPRESSOR_NAME, STDIN_MARK};
use crate::cli::op_mode::OpMode;
use crate::displaylevel;
use crate::frame::{FrameDecoder, FrameEncoder};

/// Byte-counting pass-through used for the end-of-run summary.
struct Counted<T> {
    inner: T,
    count: u64,
}

impl<T> Counted<T> {
    fn new(inner: T) -> Self {
        Self { inner, count: 0 }
    }
}

impl<R: Read> Read for Counted<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

impl<W: Write> Write for Counted<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn open_src(path: &str) -> anyhow::Result<Box<dyn Read>> {
    if path == STDIN_MARK {
        if io::stdin().is_terminal() {
            bail!("refusing to read from a console");
        }
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("{path}: cannot open"))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_dst(path: &str, force: bool) -> anyhow::Result<Box<dyn Write>> {
    if is_stdout(path) {
        return Ok(Box::new(io::stdout().lock()));
    }
    if !force && Path::new(path).exists() {
        bail!("{path} already exists; use -f to overwrite");
    }
    let file = File::create(path).with_context(|| format!("{path}: cannot create"))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn load_dictionary(job: &Job) -> anyhow::Result<Vec<u8>> {
    match &job.dictionary {
        Some(path) => fs::read(path)
            .with_context(|| format!("{}: cannot read dictionary", path.display())),
        None => Ok(Vec::new()),
    }
}

/// Binary output only reaches a terminal when `-c` asked for it.
fn guard_console(job: &Job, stdout_is_terminal: bool) -> anyhow::Result<()> {
    if is_stdout(&job.output) && stdout_is_terminal && !job.force_stdout {
        bail!("refusing to write to console without -c");
    }
    Ok(())
}

/// Run `job` to completion.
pub fn run(job: &Job) -> anyhow::Result<()> {
    guard_console(job, io::stdout().is_terminal())?;
    let dictionary = load_dictionary(job)?;
    let src = open_src(&job.input)?;
    let dst = open_dst(&job.output, job.force)?;

    let (read, written) = match (job.mode, job.raw_block) {
        (OpMode::Decompress, false) => decompress_frame_stream(src, dst, &dictionary),
        (OpMode::Decompress, true) => decompress_block(src, dst, &dictionary),
        (_, false) => compress_frame_stream(job, src, dst, &dictionary),
        (_, true) => compress_block(job, src, dst, &dictionary),
    }
    .with_context(|| format!("{}: {} failed", job.input, describe(job.mode)))?;

    let ratio = if read == 0 {
        0.0
    } else if job.mode == OpMode::Decompress {
        read as f64 / written.max(1) as f64 * 100.0
    } else {
        written as f64 / read as f64 * 100.0
    };
    displaylevel!(
        2,
        "{}: {} : {} bytes -> {} bytes ({:.2}%) => {}\n",
        COMPRESSOR_NAME,
        job.input,
        read,
        written,
        ratio,
        job.output
    );
    Ok(())
}

fn describe(mode: OpMode) -> &'static str {
    match mode {
        OpMode::Decompress => "decompression",
        _ => "compression",
    }
}

fn compress_frame_stream(
    job: &Job,
    src: Box<dyn Read>,
    dst: Box<dyn Write>,
    dictionary: &[u8],
) -> anyhow::Result<(u64, u64)> {
    let mut prefs = job.prefs;
    if job.record_content_size {
        if job.input == STDIN_MARK {
            displaylevel!(2, "content size unknown for stdin, not recorded\n");
        } else {
            let len = fs::metadata(&job.input)
                .with_context(|| format!("{}: cannot stat", job.input))?
                .len();
            prefs.content_size = Some(len);
        }
    }

    let mut src = Counted::new(src);
    let mut encoder = FrameEncoder::with_dictionary(Counted::new(dst), prefs, dictionary)?;
    io::copy(&mut src, &mut encoder)?;
    let mut sink = encoder.finish()?;
    sink.flush()?;
    Ok((src.count, sink.count))
}

fn decompress_frame_stream(
    src: Box<dyn Read>,
    dst: Box<dyn Write>,
    dictionary: &[u8],
) -> anyhow::Result<(u64, u64)> {
    let mut decoder = FrameDecoder::with_dictionary(Counted::new(src), dictionary);
    let mut dst = Counted::new(dst);
    io::copy(&mut decoder, &mut dst)?;
    dst.flush()?;
    displaylevel!(4, "decoded {} frame(s)\n", decoder.frames());
    Ok((decoder.get_ref().count, dst.count))
}

fn compress_block(
    job: &Job,
    mut src: Box<dyn Read>,
    mut dst: Box<dyn Write>,
    dictionary: &[u8],
) -> anyhow::Result<(u64, u64)> {
    let mut input = Vec::new();
    src.read_to_end(&mut input)?;
    let opts = EncodeOptions {
        level: job.prefs.level,
        dictionary: (!dictionary.is_empty()).then_some(dictionary),
        max_size: None,
    };
    let out = block::encode_to_vec(&input, &opts)?;
    dst.write_all(&out)?;
    dst.flush()?;
    Ok((input.len() as u64, out.len() as u64))
}

fn decompress_block(
    mut src: Box<dyn Read>,
    mut dst: Box<dyn Write>,
    dictionary: &[u8],
) -> anyhow::Result<(u64, u64)> {
    let mut input = Vec::new();
    src.read_to_end(&mut input)?;
    let opts = DecodeOptions {
        dictionary: (!dictionary.is_empty()).then_some(dictionary),
        ..DecodeOptions::default()
    };
    let out = block::decode_to_vec(&input, &opts)?;
    dst.write_all(&out)?;
    dst.flush()?;
    Ok((input.len() as u64, out.len() as u64))
}
