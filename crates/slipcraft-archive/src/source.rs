use std::fs::{File, Metadata};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Error, Result};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[cfg(not(unix))]
const DEFAULT_MODE: u32 = 0o644;

/// Payload file opened for streaming into an archive record.
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    file: File,
    metadata: Metadata,
    read_failed: bool,
}

impl SourceFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unreadable = |source| Error::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unreadable)?;
        let metadata = file.metadata().map_err(unreadable)?;
        if !metadata.is_file() {
            return Err(unreadable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            metadata,
            read_failed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn size(&self) -> u64 {
        self.metadata.len()
    }

    /// Falls back to the epoch on platforms without an mtime.
    pub fn modified(&self) -> SystemTime {
        self.metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH)
    }

    /// Whether a read from the file itself has failed, as opposed to the
    /// writer it was being copied into.
    pub fn read_failed(&self) -> bool {
        self.read_failed
    }

    /// Permission bits only, file type bits stripped.
    #[cfg(unix)]
    pub fn mode(&self) -> u32 {
        self.metadata.permissions().mode() & 0o7777
    }

    #[cfg(not(unix))]
    pub fn mode(&self) -> u32 {
        DEFAULT_MODE
    }
}

impl Read for SourceFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf).inspect_err(|err| {
            if err.kind() != io::ErrorKind::Interrupted {
                self.read_failed = true;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_reads_metadata_and_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pwn.sh");
        std::fs::write(&path, "echo hi").unwrap();

        let mut source = SourceFile::open(&path).unwrap();
        assert_eq!(source.size(), 7);
        assert_eq!(source.path(), path);
        assert!(source.modified() > SystemTime::UNIX_EPOCH);

        let mut content = String::new();
        source.read_to_string(&mut content).unwrap();
        assert_eq!(content, "echo hi");
        assert!(!source.read_failed());
    }

    #[cfg(unix)]
    #[test]
    fn mode_strips_file_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tool");
        std::fs::write(&path, "#!/bin/sh").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o750)).unwrap();

        let source = SourceFile::open(&path).unwrap();
        assert_eq!(source.mode(), 0o750);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempdir().unwrap();
        let err = SourceFile::open(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::SourceUnreadable { .. }));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempdir().unwrap();
        let err = SourceFile::open(dir.path()).unwrap_err();
        assert!(matches!(err, Error::SourceUnreadable { .. }));
    }
}
