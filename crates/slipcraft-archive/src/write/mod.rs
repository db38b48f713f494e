//! Format-specific record encoders behind one sink contract.

use std::io::{Seek, Write};

use tracing::debug;

use crate::error::Result;
use crate::format::ArchiveFormat;
use crate::layout::{ArchiveEntry, ArchiveLayout};
use crate::options::CraftOptions;
use crate::source::SourceFile;

mod destination;
mod tar;
mod zip;

pub(crate) use self::destination::{Destination, Tripwire};

pub use self::tar::TarSink;
pub use self::zip::ZipSink;

/// Append-only destination for archive records.
///
/// Records land in call order. `finish` must be called once all records are
/// written; dropping a sink without finishing leaves the output truncated.
/// Once the destination fails, every later call reports [`Error::Write`]
/// without touching it again.
///
/// [`Error::Write`]: crate::Error::Write
pub trait ArchiveSink {
    type Inner;

    /// `path` gains a trailing `/` if it lacks one.
    fn write_directory(&mut self, path: &str) -> Result<()>;

    /// `target` is stored verbatim as the link payload.
    fn write_symlink(&mut self, path: &str, target: &str) -> Result<()>;

    /// Streams the whole source into a regular-file record.
    fn write_file(&mut self, path: &str, source: &mut SourceFile) -> Result<()>;

    /// Flush all buffered or compressed state and hand back the destination.
    fn finish(self) -> Result<Self::Inner>;
}

/// Sink chosen once, from [`ArchiveFormat`], at construction time.
pub enum ArchiveWriter<W: Write + Seek> {
    Zip(ZipSink<W>),
    Tar(TarSink<W>),
}

impl<W: Write + Seek> ArchiveWriter<W> {
    pub fn new(writer: W, options: &CraftOptions) -> Self {
        match options.format {
            ArchiveFormat::Zip => Self::Zip(ZipSink::new(writer, options)),
            ArchiveFormat::Tar => Self::Tar(TarSink::new(writer, options)),
        }
    }

    pub fn format(&self) -> ArchiveFormat {
        match self {
            Self::Zip(_) => ArchiveFormat::Zip,
            Self::Tar(_) => ArchiveFormat::Tar,
        }
    }
}

impl<W: Write + Seek> ArchiveSink for ArchiveWriter<W> {
    type Inner = W;

    fn write_directory(&mut self, path: &str) -> Result<()> {
        match self {
            Self::Zip(sink) => sink.write_directory(path),
            Self::Tar(sink) => sink.write_directory(path),
        }
    }

    fn write_symlink(&mut self, path: &str, target: &str) -> Result<()> {
        match self {
            Self::Zip(sink) => sink.write_symlink(path, target),
            Self::Tar(sink) => sink.write_symlink(path, target),
        }
    }

    fn write_file(&mut self, path: &str, source: &mut SourceFile) -> Result<()> {
        match self {
            Self::Zip(sink) => sink.write_file(path, source),
            Self::Tar(sink) => sink.write_file(path, source),
        }
    }

    fn finish(self) -> Result<W> {
        match self {
            Self::Zip(sink) => sink.finish(),
            Self::Tar(sink) => sink.finish(),
        }
    }
}

/// Write every entry of `layout` to `sink` in construction order.
///
/// Does not finish the sink.
pub fn write_layout<S: ArchiveSink>(layout: &ArchiveLayout, sink: &mut S) -> Result<()> {
    for entry in layout.entries() {
        debug!(kind = entry.kind_name(), path = entry.path(), "writing entry");
        match entry {
            ArchiveEntry::Directory { path } => sink.write_directory(path)?,
            ArchiveEntry::Symlink { path, target } => sink.write_symlink(path, target)?,
            ArchiveEntry::File { path, source } => {
                let mut source = SourceFile::open(source)?;
                sink.write_file(path, &mut source)?;
            }
        }
    }
    Ok(())
}
