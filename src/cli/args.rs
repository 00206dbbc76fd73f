//! Command-line argument model for the `lz4` binary.
//!
//! clap parses and type-checks every option; [`Cli::resolve`] then fills in
//! defaults (operation mode from the file extension, output name from the
//! input name, level from `LZ4_CLEVEL`) and produces a [`Job`].

use std::path::PathBuf;

use anyhow::bail;
use clap::{ArgAction, Parser};

use crate::cli::constants::{is_stdin, LZ4_EXTENSION, STDIN_MARK, STDOUT_MARK};
use crate::cli::op_mode::{determine_op_mode, OpMode};
use crate::display::DISPLAY_LEVEL_DEFAULT;
use crate::frame::{BlockMode, BlockSizeId, Preferences};

#[derive(Debug, Parser)]
#[command(
    name = "lz4",
    version,
    about = "Compress or decompress .lz4 files",
    after_help = "With no INPUT, or when INPUT is `-`, read standard input."
)]
pub struct Cli {
    /// Force compression.
    #[arg(short = 'z', long, conflicts_with = "decompress")]
    pub compress: bool,

    /// Decompress.
    #[arg(short = 'd', long, visible_alias = "uncompress")]
    pub decompress: bool,

    /// Write to standard output.
    #[arg(short = 'c', long)]
    pub stdout: bool,

    /// Overwrite existing output files.
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Compression level; negative values trade ratio for speed.
    #[arg(short = 'l', long, allow_negative_numbers = true)]
    pub level: Option<i32>,

    /// Block size: 4-7, or 64KB / 256KB / 1MB / 4MB.
    #[arg(short = 'B', long = "block-size")]
    pub block_size: Option<BlockSizeId>,

    /// Compress each block independently.
    #[arg(long)]
    pub independent: bool,

    /// Add a checksum after every block.
    #[arg(long)]
    pub block_checksum: bool,

    /// Add a checksum of the whole content after the end mark.
    #[arg(long)]
    pub content_checksum: bool,

    /// Record the input size in the frame header (file inputs only).
    #[arg(long)]
    pub content_size: bool,

    /// Dictionary file used for compression and decompression.
    #[arg(short = 'D', long)]
    pub dictionary: Option<PathBuf>,

    /// Dictionary ID to record in the frame header.
    #[arg(long)]
    pub dict_id: Option<u32>,

    /// Use the bare block format instead of frames.
    #[arg(long)]
    pub block: bool,

    /// More messages (repeatable).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Fewer messages (repeatable).
    #[arg(short = 'q', long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Input file; `-` or absent reads standard input.
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Output file; derived from INPUT when absent.
    #[arg(value_name = "OUTPUT")]
    pub output: Option<String>,
}

/// Fully resolved work description.
#[derive(Debug, Clone)]
pub struct Job {
    pub mode: OpMode,
    pub input: String,
    pub output: String,
    pub force: bool,
    /// `-c` was given: binary output may go to a terminal.
    pub force_stdout: bool,
    pub raw_block: bool,
    pub record_content_size: bool,
    pub prefs: Preferences,
    pub dictionary: Option<PathBuf>,
    pub display_level: u32,
}

/// Parse an explicit argument list (`argv[0]` included).
pub fn parse_args_from<I, T>(argv: I) -> anyhow::Result<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Ok(Cli::try_parse_from(argv)?)
}

impl Cli {
    /// Apply defaults. `default_level` is used when `--level` is absent.
    pub fn resolve(self, default_level: i32) -> anyhow::Result<Job> {
        let input = match self.input {
            Some(path) if !is_stdin(&path) => path,
            _ => STDIN_MARK.to_owned(),
        };
        let reading_stdin = input == STDIN_MARK;

        let mode = if self.decompress {
            OpMode::Decompress
        } else if self.compress || reading_stdin {
            OpMode::Compress
        } else {
            determine_op_mode(&input)
        };

        let output = if self.stdout || (reading_stdin && self.output.is_none()) {
            STDOUT_MARK.to_owned()
        } else if let Some(out) = self.output {
            if is_stdin(&out) {
                STDOUT_MARK.to_owned()
            } else {
                out
            }
        } else {
            match mode {
                OpMode::Decompress => match input.strip_suffix(LZ4_EXTENSION) {
                    Some(base) if !base.is_empty() => base.to_owned(),
                    _ => bail!("cannot determine an output filename for `{input}`"),
                },
                _ => format!("{input}{LZ4_EXTENSION}"),
            }
        };

        let display_level = (DISPLAY_LEVEL_DEFAULT + self.verbose as u32)
            .saturating_sub(self.quiet as u32);

        let prefs = Preferences {
            level: self.level.unwrap_or(default_level),
            block_size: self.block_size.unwrap_or_default(),
            block_mode: if self.independent {
                BlockMode::Independent
            } else {
                BlockMode::Linked
            },
            block_checksum: self.block_checksum,
            content_checksum: self.content_checksum,
            content_size: None,
            dict_id: self.dict_id,
        };

        Ok(Job {
            mode,
            input,
            output,
            force: self.force,
            force_stdout: self.stdout,
            raw_block: self.block,
            record_content_size: self.content_size,
            prefs,
            dictionary: self.dictionary,
            display_level,
        })
    }
}
