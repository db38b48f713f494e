//! Decode an archive back into its raw records.
//!
//! Names come back exactly as stored, with no sanitization, so a crafted
//! archive can be compared against the layout it was built from.

use std::io::{Read, Seek};

use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::layout::directory_name;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InspectedEntry {
    pub path: String,
    pub kind: InspectedKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InspectedKind {
    Directory,
    Symlink { target: String },
    File { contents: Vec<u8> },
}

pub fn read_entries<R: Read + Seek>(reader: R, format: ArchiveFormat) -> Result<Vec<InspectedEntry>> {
    match format {
        ArchiveFormat::Zip => read_zip(reader),
        ArchiveFormat::Tar => read_tar(reader),
    }
}

fn read_zip<R: Read + Seek>(reader: R) -> Result<Vec<InspectedEntry>> {
    let corrupted = |source: zip::result::ZipError| Error::Zip {
        path: String::new(),
        source,
    };
    let mut archive = zip::ZipArchive::new(reader).map_err(corrupted)?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(corrupted)?;
        let name = file.name().to_string();

        let kind = if file.is_dir() {
            InspectedKind::Directory
        } else if file.is_symlink() {
            let mut target = String::new();
            file.read_to_string(&mut target)?;
            InspectedKind::Symlink { target }
        } else {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            InspectedKind::File { contents }
        };

        entries.push(InspectedEntry { path: name, kind });
    }
    Ok(entries)
}

fn read_tar<R: Read>(reader: R) -> Result<Vec<InspectedEntry>> {
    let mut archive = tar::Archive::new(reader);

    let mut entries = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let entry_type = entry.header().entry_type();

        let (path, kind) = if entry_type.is_dir() {
            (directory_name(&path), InspectedKind::Directory)
        } else if entry_type.is_symlink() {
            let target = entry
                .link_name_bytes()
                .map(|t| String::from_utf8_lossy(&t).into_owned())
                .unwrap_or_default();
            (path, InspectedKind::Symlink { target })
        } else {
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            (path, InspectedKind::File { contents })
        };

        entries.push(InspectedEntry { path, kind });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CraftOptions;
    use crate::write::{ArchiveSink, ArchiveWriter};
    use std::io::Cursor;

    fn sample(format: ArchiveFormat) -> Vec<u8> {
        let options = CraftOptions::default().format(format);
        let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()), &options);
        writer.write_directory("sub").unwrap();
        writer.write_symlink("sub/root", "../").unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn reads_back_both_formats() {
        for format in [ArchiveFormat::Zip, ArchiveFormat::Tar] {
            let entries = read_entries(Cursor::new(sample(format)), format).unwrap();
            assert_eq!(
                entries,
                [
                    InspectedEntry {
                        path: "sub/".into(),
                        kind: InspectedKind::Directory,
                    },
                    InspectedEntry {
                        path: "sub/root".into(),
                        kind: InspectedKind::Symlink {
                            target: "../".into(),
                        },
                    },
                ],
                "{format}"
            );
        }
    }

    #[test]
    fn garbage_is_not_a_zip() {
        let err = read_entries(Cursor::new(b"not an archive".to_vec()), ArchiveFormat::Zip)
            .unwrap_err();
        assert!(matches!(err, Error::Zip { .. }));
    }
}
