//! Command-line interface for the `lz4` binary.
//!
//! | Submodule     | Responsibility |
//! |---------------|----------------|
//! | [`constants`] | Program identity strings and stdin/stdout sentinels. |
//! | [`op_mode`]   | `OpMode` and the `LZ4_CLEVEL` default. |
//! | [`args`]      | clap argument model and its resolution into a [`args::Job`]. |
//! | [`run`]       | Opens the input and output and drives the codec. |
//!
//! Typical call sequence: `Cli::try_parse_from` → `Cli::resolve` → `run::run`.

pub mod args;
pub mod constants;
pub mod op_mode;
pub mod run;
