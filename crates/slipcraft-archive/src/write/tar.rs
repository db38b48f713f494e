use std::io::{self, Write};
use std::time::SystemTime;

use tar::{Builder, EntryType, Header};

use crate::error::{Error, Result};
use crate::layout::directory_name;
use crate::options::{CraftOptions, DIRECTORY_MODE, SYMLINK_MODE};
use crate::source::SourceFile;
use crate::write::{ArchiveSink, Destination, Tripwire};

/// Uncompressed POSIX (ustar) tar stream.
///
/// Names too long for the ustar fields are carried by GNU long-name
/// records, which the `tar` builder emits on its own.
pub struct TarSink<W: Write> {
    builder: Builder<Destination<W>>,
    tripwire: Tripwire,
    mtime: u64,
}

impl<W: Write> TarSink<W> {
    pub fn new(writer: W, options: &CraftOptions) -> Self {
        let (destination, tripwire) = Destination::new(writer);
        Self {
            builder: Builder::new(destination),
            tripwire,
            mtime: unix_seconds(options.timestamp),
        }
    }

    fn header(&self, entry_type: EntryType, mode: u32) -> Header {
        let mut header = Header::new_ustar();
        header.set_entry_type(entry_type);
        header.set_mode(mode);
        header.set_size(0);
        header.set_mtime(self.mtime);
        header
    }

    /// The builder reports destination failures and rejected headers alike;
    /// the tripwire tells them apart.
    fn entry_error(&self, kind: &'static str, path: &str, source: io::Error) -> Error {
        let path = path.to_string();
        if self.tripwire.tripped() {
            Error::Write { path, source }
        } else {
            Error::Encode { kind, path, source }
        }
    }
}

impl<W: Write> ArchiveSink for TarSink<W> {
    type Inner = W;

    fn write_directory(&mut self, path: &str) -> Result<()> {
        let name = directory_name(path);
        self.tripwire.check(&name)?;
        let mut header = self.header(EntryType::Directory, DIRECTORY_MODE);
        let result = self.builder.append_data(&mut header, &name, io::empty());
        result.map_err(|source| self.entry_error("directory", &name, source))
    }

    fn write_symlink(&mut self, path: &str, target: &str) -> Result<()> {
        self.tripwire.check(path)?;
        let mut header = self.header(EntryType::Symlink, SYMLINK_MODE);

        // The link name goes in byte for byte; `append_link` would normalize
        // it as a path and drop the trailing `/`. Only targets that overflow
        // the header field take the long-link route.
        let result = if header.set_link_name_literal(target).is_ok() {
            self.builder.append_data(&mut header, path, io::empty())
        } else {
            self.builder.append_link(&mut header, path, target)
        };
        result.map_err(|source| self.entry_error("symlink", path, source))
    }

    fn write_file(&mut self, path: &str, source: &mut SourceFile) -> Result<()> {
        self.tripwire.check(path)?;
        let mut header = Header::new_ustar();
        header.set_metadata(source.metadata());
        header.set_entry_type(EntryType::Regular);
        header.set_size(source.size());

        let result = self.builder.append_data(&mut header, path, &mut *source);
        result.map_err(|err| {
            if source.read_failed() {
                Error::SourceUnreadable {
                    path: source.path().to_path_buf(),
                    source: err,
                }
            } else {
                self.entry_error("file", path, err)
            }
        })
    }

    fn finish(self) -> Result<W> {
        if self.tripwire.tripped() {
            return Err(Error::Finalize {
                source: io::Error::other("archive destination failed on an earlier record"),
            });
        }
        self.builder
            .into_inner()
            .map(Destination::into_inner)
            .map_err(|source| Error::Finalize { source })
    }
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
