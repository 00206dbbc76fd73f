//! Binary entry point for the `lz4` command-line tool.
//!
//! Parses arguments, resolves defaults (mode from the file extension,
//! output name, `LZ4_CLEVEL`), then runs the job. Errors are printed at
//! display level 1 and turn into exit status 1.

use clap::Parser;

use lz4_codec::cli::args::Cli;
use lz4_codec::cli::op_mode::init_c_level;
use lz4_codec::cli::run::run;
use lz4_codec::display::set_display_level;
use lz4_codec::displaylevel;

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::try_parse().unwrap_or_else(|e| e.exit());
    let job = cli.resolve(init_c_level())?;
    set_display_level(job.display_level);
    displaylevel!(
        3,
        "*** {} v{} {}-bit ***\n",
        lz4_codec::cli::constants::COMPRESSOR_NAME,
        lz4_codec::VERSION,
        std::mem::size_of::<usize>() * 8
    );
    run(&job)
}

fn main() {
    if let Err(e) = try_main() {
        displaylevel!(1, "lz4: {:#}\n", e);
        std::process::exit(1);
    }
}
