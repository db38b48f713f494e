use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported archive format '{0}' (expected 'zip' or 'tar')")]
    UnsupportedFormat(String),

    #[error("invalid relative path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("failed to read source file '{path}': {source}")]
    SourceUnreadable { path: PathBuf, source: io::Error },

    #[error("failed to create archive '{path}': {source}")]
    DestinationUnwritable { path: PathBuf, source: io::Error },

    #[error("failed to write entry '{path}' to the archive: {source}")]
    Write { path: String, source: io::Error },

    #[error("failed to encode {kind} entry '{path}': {source}")]
    Encode {
        kind: &'static str,
        path: String,
        source: io::Error,
    },

    #[error("failed to encode zip entry '{path}': {source}")]
    Zip {
        path: String,
        source: zip::result::ZipError,
    },

    #[error("failed to finalize archive: {source}")]
    Finalize { source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Coarse failure category, one per class of caller reaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidInput,
    Io,
    Format,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat(_) => ErrorKind::Configuration,
            Self::InvalidPath { .. } => ErrorKind::InvalidInput,
            Self::SourceUnreadable { .. }
            | Self::DestinationUnwritable { .. }
            | Self::Write { .. }
            | Self::Finalize { .. }
            | Self::Io(_) => ErrorKind::Io,
            Self::Encode { .. } | Self::Zip { .. } => ErrorKind::Format,
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            Error::UnsupportedFormat("rar".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            Error::invalid_path("", "path is empty").kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            Error::Finalize {
                source: io::Error::other("disk full"),
            }
            .kind(),
            ErrorKind::Io
        );
        assert_eq!(
            Error::Write {
                path: "sub/".into(),
                source: io::Error::other("disk full"),
            }
            .kind(),
            ErrorKind::Io
        );
        assert_eq!(
            Error::Encode {
                kind: "symlink",
                path: "sub/root".into(),
                source: io::Error::other("name too long"),
            }
            .kind(),
            ErrorKind::Format
        );
    }

    #[test]
    fn messages_name_the_offender() {
        let err = Error::invalid_path("../a//b", "empty path component");
        assert_eq!(
            err.to_string(),
            "invalid relative path '../a//b': empty path component"
        );

        let err = Error::UnsupportedFormat("rar".into());
        assert!(err.to_string().contains("'rar'"));
    }
}
