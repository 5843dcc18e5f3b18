//! In-memory ZIP archives of a source tree
//!
//! The archive is built fully in memory: either a complete buffer is
//! returned or an error is, never a partial archive. Entry names are
//! relative to the source directory with `/` separators and no leading
//! segment for the root itself.

mod builder;

use std::path::PathBuf;

use thiserror::Error;

pub use builder::{build_archive, build_archive_blocking, validate_source};

/// Reasons an archive could not be produced.
///
/// Precondition failures are checked in declaration order, so a missing
/// path is always reported as `NotFound` even when it is also outside
/// the project.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Source path is empty")]
    EmptyPath,

    #[error("Source path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Source path is a file, not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Source directory is not readable: {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Source path {} is outside the project {}",
        .source_path.display(),
        .project.display()
    )]
    OutsideProject {
        source_path: PathBuf,
        project: PathBuf,
    },

    #[error("Failed to archive {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive task failed: {0}")]
    Join(String),
}

/// A complete, compressed archive owned by a single deployment run.
#[derive(Clone, PartialEq, Eq)]
pub struct Archive {
    bytes: Vec<u8>,
    file_count: usize,
}

impl Archive {
    pub(crate) fn new(bytes: Vec<u8>, file_count: usize) -> Self {
        Self { bytes, file_count }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of regular files stored in the archive.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// blake3 hex digest of the archive bytes
    pub fn digest(&self) -> String {
        blake3::hash(&self.bytes).to_hex().to_string()
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("size_bytes", &self.bytes.len())
            .field("file_count", &self.file_count)
            .finish()
    }
}
