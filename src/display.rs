//! Display-level logging shared by the library and the `lz4` binary.
//!
//! A single process-wide level decides what reaches stderr:
//!
//! | level | meaning                                   |
//! |-------|-------------------------------------------|
//! | 0     | silent                                    |
//! | 1     | errors only                               |
//! | 2     | normal, downgradable (default)            |
//! | 3     | informational (frame summaries)           |
//! | 4     | verbose (header negotiation, per-frame)   |
//! | 5     | trace (per-block decisions)               |
//!
//! The library never prints below level 3, so embedding it with the default
//! level keeps stderr clean.

use std::sync::atomic::{AtomicU32, Ordering};

/// Default display level.
pub const DISPLAY_LEVEL_DEFAULT: u32 = 2;

/// Highest meaningful display level.
pub const DISPLAY_LEVEL_MAX: u32 = 5;

static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(DISPLAY_LEVEL_DEFAULT);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level, saturating at [`DISPLAY_LEVEL_MAX`].
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level.min(DISPLAY_LEVEL_MAX), Ordering::Relaxed);
}

/// Print to stderr when the display level is at least `$level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::display::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}
