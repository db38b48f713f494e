use std::io::{self, Seek, Write};
use std::time::SystemTime;

use tracing::warn;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::layout::directory_name;
use crate::options::{CraftOptions, DIRECTORY_MODE, SYMLINK_MODE};
use crate::source::SourceFile;
use crate::write::{ArchiveSink, Destination, Tripwire};

/// Payloads at or above this size need zip64 records.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

pub struct ZipSink<W: Write + Seek> {
    writer: ZipWriter<Destination<W>>,
    tripwire: Tripwire,
    modified: zip::DateTime,
}

impl<W: Write + Seek> ZipSink<W> {
    pub fn new(writer: W, options: &CraftOptions) -> Self {
        let (destination, tripwire) = Destination::new(writer);
        Self {
            writer: ZipWriter::new(destination),
            tripwire,
            modified: dos_time(options.timestamp),
        }
    }

    fn stored(&self, mode: u32) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(mode)
            .last_modified_time(self.modified)
    }
}

/// I/O failures come from the destination; the rest are encoding errors.
fn entry_error(path: &str, err: ZipError) -> Error {
    let path = path.to_string();
    match err {
        ZipError::Io(source) => Error::Write { path, source },
        source => Error::Zip { path, source },
    }
}

impl<W: Write + Seek> ArchiveSink for ZipSink<W> {
    type Inner = W;

    fn write_directory(&mut self, path: &str) -> Result<()> {
        let name = directory_name(path);
        self.tripwire.check(&name)?;
        let options = self.stored(DIRECTORY_MODE);
        self.writer
            .add_directory(name.as_str(), options)
            .map_err(|err| entry_error(&name, err))
    }

    fn write_symlink(&mut self, path: &str, target: &str) -> Result<()> {
        self.tripwire.check(path)?;
        let options = self.stored(SYMLINK_MODE);
        self.writer
            .add_symlink(path, target, options)
            .map_err(|err| entry_error(path, err))
    }

    fn write_file(&mut self, path: &str, source: &mut SourceFile) -> Result<()> {
        self.tripwire.check(path)?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(source.mode())
            .last_modified_time(dos_time(source.modified()))
            .large_file(source.size() >= ZIP64_THRESHOLD);

        self.writer
            .start_file(path, options)
            .map_err(|err| entry_error(path, err))?;
        io::copy(&mut *source, &mut self.writer).map_err(|err| {
            if source.read_failed() {
                Error::SourceUnreadable {
                    path: source.path().to_path_buf(),
                    source: err,
                }
            } else {
                Error::Write {
                    path: path.to_string(),
                    source: err,
                }
            }
        })?;
        Ok(())
    }

    fn finish(self) -> Result<W> {
        if self.tripwire.tripped() {
            return Err(Error::Finalize {
                source: io::Error::other("archive destination failed on an earlier record"),
            });
        }
        self.writer
            .finish()
            .map(Destination::into_inner)
            .map_err(|err| Error::Finalize { source: err.into() })
    }
}

/// Zip records hold local DOS time from 1980 to 2107; anything outside
/// that window is clamped to the DOS epoch.
fn dos_time(time: SystemTime) -> zip::DateTime {
    let utc: chrono::DateTime<chrono::Utc> = time.into();
    zip::DateTime::try_from(utc.naive_utc()).unwrap_or_else(|_| {
        warn!(time = %utc, "timestamp outside the zip range, using 1980-01-01");
        zip::DateTime::default()
    })
}
