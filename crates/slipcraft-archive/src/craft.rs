use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::layout::ArchiveLayout;
use crate::options::CraftOptions;
use crate::plan::plan;
use crate::resolve::{Location, landing};
use crate::write::{ArchiveSink, ArchiveWriter, write_layout};

/// Summary of one crafted archive.
#[derive(Clone, Debug)]
pub struct CraftReport {
    pub format: ArchiveFormat,
    pub destination: PathBuf,
    pub entry_count: usize,
    pub depth: usize,
    pub payload_path: String,
    pub landing: Location,
    pub bytes_written: u64,
}

/// Plan `relative_path`, build its layout around `source`.
pub fn prepare(source: impl AsRef<Path>, relative_path: &str) -> Result<ArchiveLayout> {
    let plan = plan(relative_path)?;
    let layout = ArchiveLayout::build(&plan, source);
    debug!(
        depth = plan.depth(),
        directories = plan.directories().len(),
        entries = layout.len(),
        "planned layout"
    );
    Ok(layout)
}

/// Serialize `layout` into `writer` and return it once fully flushed.
pub fn write_archive<W: Write + Seek>(
    layout: &ArchiveLayout,
    writer: W,
    options: &CraftOptions,
) -> Result<W> {
    let mut sink = ArchiveWriter::new(writer, options);
    write_layout(layout, &mut sink)?;
    sink.finish()
}

/// Build the archive for `relative_path` and place it at `destination`.
///
/// The archive is assembled in a temporary file next to `destination` and
/// only moved into place once it has been completely written and synced, so
/// a failed run never leaves a partial archive behind.
pub fn craft(
    source: impl AsRef<Path>,
    relative_path: &str,
    destination: impl AsRef<Path>,
    options: &CraftOptions,
) -> Result<CraftReport> {
    let destination = destination.as_ref();
    let layout = prepare(source, relative_path)?;
    let landing = landing(&layout)?;

    let unwritable = |source| Error::DestinationUnwritable {
        path: destination.to_path_buf(),
        source,
    };
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staging = tempfile::Builder::new()
        .prefix(".slipcraft-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(unwritable)?;

    let staging = write_staged(&layout, staging, options)?;
    let bytes_written = staging
        .as_file()
        .metadata()
        .map_err(|source| Error::Finalize { source })?
        .len();
    staging
        .persist(destination)
        .map_err(|err| Error::Finalize { source: err.error })?;

    let report = CraftReport {
        format: options.format,
        destination: destination.to_path_buf(),
        entry_count: layout.len(),
        depth: layout.depth(),
        payload_path: layout.payload().path().to_string(),
        landing,
        bytes_written,
    };
    info!(
        format = %report.format,
        destination = %report.destination.display(),
        entries = report.entry_count,
        depth = report.depth,
        landing = %report.landing,
        "archive written"
    );
    Ok(report)
}

/// Writer first, then the buffer, then the file itself.
fn write_staged(
    layout: &ArchiveLayout,
    staging: NamedTempFile,
    options: &CraftOptions,
) -> Result<NamedTempFile> {
    let buffered = write_archive(layout, BufWriter::new(staging), options)?;
    let staging = buffered
        .into_inner()
        .map_err(|err| Error::Finalize {
            source: err.into_error(),
        })?;
    staging
        .as_file()
        .sync_all()
        .map_err(|source| Error::Finalize { source })?;
    Ok(staging)
}
