//! Program identity strings and I/O sentinels for the `lz4` binary.

pub const COMPRESSOR_NAME: &str = "lz4";
pub const LZ4_EXTENSION: &str = ".lz4";

/// Sentinel: read from standard input.
pub const STDIN_MARK: &str = "stdin";

/// Sentinel: write to standard output.
pub const STDOUT_MARK: &str = "stdout";

/// Short alias accepted for both stdin and stdout.
pub const DASH_MARK: &str = "-";

/// Environment variable overriding the default compression level.
pub const ENV_CLEVEL: &str = "LZ4_CLEVEL";

#[inline]
pub fn is_stdin(path: &str) -> bool {
    path == STDIN_MARK || path == DASH_MARK
}

#[inline]
pub fn is_stdout(path: &str) -> bool {
    path == STDOUT_MARK || path == DASH_MARK
}
