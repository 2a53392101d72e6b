//! Error types for extension folder resolution.
//!
//! Only hard failures live here. An absent, malformed or foreign marker file and
//! an exhausted upward walk are soft outcomes and never surface as an `Error`.

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required caller argument is missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The marker file exists but could not be read.
    #[error("failed to read marker file {}: {source}", .path.display())]
    ReadMarker {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The data directory chain could not be created.
    #[error("failed to create data directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to determine current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("failed to read layout file {}: {source}", .path.display())]
    ReadLayout {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse layout file {}: {source}", .path.display())]
    ParseLayout {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Io,
    Parse,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::ReadMarker { .. }
            | Error::CreateDir { .. }
            | Error::CurrentDir(_)
            | Error::ReadLayout { .. } => ErrorKind::Io,
            Error::ParseLayout { .. } => ErrorKind::Parse,
        }
    }

    /// Returns true for missing or empty caller arguments.
    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }
}
