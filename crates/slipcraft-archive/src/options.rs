use std::time::SystemTime;

use crate::format::ArchiveFormat;

/// Mode bits of synthesized directory records.
pub const DIRECTORY_MODE: u32 = 0o755;
/// Mode bits of symlink records.
pub const SYMLINK_MODE: u32 = 0o777;

/// Immutable settings for one crafting run.
#[derive(Clone, Debug)]
pub struct CraftOptions {
    pub format: ArchiveFormat,
    pub timestamp: SystemTime,
}

impl Default for CraftOptions {
    fn default() -> Self {
        Self {
            format: ArchiveFormat::default(),
            timestamp: SystemTime::now(),
        }
    }
}

impl CraftOptions {
    pub fn format(mut self, format: ArchiveFormat) -> Self {
        self.format = format;
        self
    }

    /// Modification time of every directory and symlink record.
    ///
    /// The payload keeps the source file's own mtime.
    pub fn timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }
}
