//! Scanner module for directory traversal and content fingerprinting.
//!
//! This module provides functionality for:
//! - Sorted directory walking using jwalk (recursive or single level)
//! - Bounded-prefix fingerprints with keyed BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and [`FileRecord`] discovery
//! - [`hasher`]: Prefix fingerprinting keyed by file size
//!
//! # Example
//!
//! ```no_run
//! use dupecat::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::new(true));
//! for record in walker.scan().unwrap() {
//!     println!("{}: {} bytes", record.full_path.display(), record.size);
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};

pub use hasher::{fingerprint_bytes, hash_to_hex, size_key, Fingerprinter, Hash, PREFIX_SIZE};
pub use walker::{scan, Walker};

/// A file discovered by the scanner.
///
/// The size is captured once at discovery and never re-read from disk. The
/// fingerprint stays unset until the hashing phase assigns it.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Base file name
    pub name: String,
    /// Directory containing the file
    pub directory: PathBuf,
    /// `directory` joined with `name`; used for all I/O
    pub full_path: PathBuf,
    /// File size in bytes at discovery time
    pub size: u64,
    fingerprint: Option<Hash>,
}

impl FileRecord {
    /// Create a record from its containing directory and base name.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, name: impl Into<String>, size: u64) -> Self {
        let directory = directory.into();
        let name = name.into();
        let full_path = directory.join(&name);
        Self {
            name,
            directory,
            full_path,
            size,
            fingerprint: None,
        }
    }

    /// Create a record from a full path.
    ///
    /// The path is kept as given for I/O, so names that are not valid UTF-8
    /// still resolve to the right file even though `name` is lossy.
    #[must_use]
    pub fn from_path(path: &Path, size: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            name,
            directory,
            full_path: path.to_path_buf(),
            size,
            fingerprint: None,
        }
    }

    /// The content fingerprint, if the hashing phase has run for this record.
    #[must_use]
    pub fn fingerprint(&self) -> Option<&Hash> {
        self.fingerprint.as_ref()
    }

    /// Fingerprint as lowercase hex, empty when unset.
    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint.as_ref().map(hash_to_hex).unwrap_or_default()
    }

    /// Assign the fingerprint. Each record is fingerprinted at most once.
    pub(crate) fn set_fingerprint(&mut self, hash: Hash) {
        debug_assert!(
            self.fingerprint.is_none(),
            "fingerprint already set for {}",
            self.full_path.display()
        );
        self.fingerprint = Some(hash);
    }

    /// Whether both records have the same byte size.
    #[must_use]
    pub fn same_size_as(&self, other: &FileRecord) -> bool {
        self.size == other.size
    }

    /// Whether both records carry the same fingerprint.
    ///
    /// Records that have not been fingerprinted never match.
    #[must_use]
    pub fn same_fingerprint_as(&self, other: &FileRecord) -> bool {
        match (&self.fingerprint, &other.fingerprint) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Descend into subdirectories.
    pub recursive: bool,

    /// Skip hidden files and directories (names starting with `.`).
    /// Hidden directories are pruned, not descended into.
    pub skip_hidden: bool,
}

impl WalkerConfig {
    /// Hidden entries are skipped in recursive mode and kept when listing a
    /// single directory.
    #[must_use]
    pub fn new(recursive: bool) -> Self {
        Self {
            recursive,
            skip_hidden: recursive,
        }
    }

    /// Override hidden-entry filtering.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The scan root does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root exists but holds no eligible (regular, non-empty) files.
    #[error("No files found in {0}")]
    NoFilesFound(PathBuf),

    /// The walk was stopped by the shutdown flag.
    #[error("Scan interrupted")]
    Interrupted,

    /// An I/O error occurred while accessing a file or directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while fingerprinting a file.
///
/// Every variant means "drop this record"; none of them abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file vanished after discovery.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    pub(crate) fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
