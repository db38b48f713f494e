//! Archives that escape their extraction root through chained symlinks.
//!
//! Given a relative target such as `../../tmp/pwn.sh`, the crate builds a
//! zip or tar archive whose payload is written outside the extraction
//! directory by any extractor that follows symlinks while resolving entry
//! names, without canonicalizing them or checking containment. Use it to
//! check that an extractor is *not* one of those.
//!
//! # Architecture
//!
//! - `plan.rs` - Ascent depth and remaining components of the target path
//! - `layout.rs` - Ordered directory/symlink/file entries realizing the escape
//! - `write/` - Per-format record encoders behind [`ArchiveSink`]
//! - `resolve.rs` - Naive-extractor model of where the payload lands
//! - `inspect.rs` - Raw decoding of produced archives
//! - `craft.rs` - One run: plan, build, write, persist
//!
//! # Example
//!
//! ```no_run
//! use slipcraft_archive::{ArchiveFormat, CraftOptions, craft};
//!
//! let options = CraftOptions::default().format(ArchiveFormat::Tar);
//! let report = craft("payload.sh", "../../tmp/pwn.sh", "evil.tar", &options)?;
//! assert_eq!(report.depth, 2);
//! # Ok::<(), slipcraft_archive::Error>(())
//! ```

pub use craft::{CraftReport, craft, prepare, write_archive};
pub use error::{Error, ErrorKind, Result};
pub use format::ArchiveFormat;
pub use layout::{ArchiveEntry, ArchiveLayout};
pub use options::CraftOptions;
pub use plan::{TraversalPlan, plan};
pub use resolve::{Location, landing};
pub use source::SourceFile;
pub use write::{ArchiveSink, ArchiveWriter, TarSink, ZipSink, write_layout};

mod craft;
mod error;
mod format;
pub mod inspect;
pub mod layout;
pub mod options;
pub mod plan;
pub mod resolve;
mod source;
pub mod write;
