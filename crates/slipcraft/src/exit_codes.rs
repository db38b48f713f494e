//! Process exit codes, one per failure category.

use slipcraft_archive::ErrorKind;

pub const SUCCESS: i32 = 0;
pub const IO_ERROR: i32 = 1; // Source unreadable, destination unwritable or full, finalize failed
pub const CONFIG_ERROR: i32 = 2; // Unknown archive type or bad flags
pub const INVALID_INPUT: i32 = 3; // Malformed relative path
pub const FORMAT_ERROR: i32 = 4; // Record could not be encoded, or --verify mismatch

pub fn for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Configuration => CONFIG_ERROR,
        ErrorKind::InvalidInput => INVALID_INPUT,
        ErrorKind::Io => IO_ERROR,
        ErrorKind::Format => FORMAT_ERROR,
    }
}
