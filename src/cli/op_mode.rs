//! Operation mode selection and environment-based defaults.

use crate::cli::constants::{ENV_CLEVEL, LZ4_EXTENSION};
use crate::config::CLEVEL_DEFAULT;
use crate::displaylevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpMode {
    /// Decide from the input file name.
    Auto,
    Compress,
    Decompress,
}

/// `.lz4` inputs decompress, everything else compresses.
pub fn determine_op_mode(filename: &str) -> OpMode {
    if filename.ends_with(LZ4_EXTENSION) {
        OpMode::Decompress
    } else {
        OpMode::Compress
    }
}

/// Default level, honouring `LZ4_CLEVEL`.
pub fn init_c_level() -> i32 {
    init_c_level_from(std::env::var(ENV_CLEVEL).ok().as_deref())
}

/// Parse an `LZ4_CLEVEL` value; invalid values are reported and ignored.
pub fn init_c_level_from(env_val: Option<&str>) -> i32 {
    if let Some(env) = env_val {
        if let Ok(level) = env.trim().parse::<i32>() {
            return level;
        }
        displaylevel!(
            2,
            "Ignore environment variable setting {}={}: not a valid integer value\n",
            ENV_CLEVEL,
            env
        );
    }
    CLEVEL_DEFAULT
}
