//! Junk file deletion.
//!
//! # Overview
//!
//! This module removes junk records found by the detector:
//! - Permanent removal (default)
//! - Move to system trash (recoverable, via the `trash` crate)
//! - Batch operations that keep going after per-file failures
//!
//! A file that disappeared between detection and deletion is not an error
//! for a batch: it is reported as already absent and counts as done.
//!
//! # Example
//!
//! ```no_run
//! use dupecat::actions::delete::{delete_batch, DeleteConfig};
//! use dupecat::duplicates::DuplicateDetector;
//!
//! let mut detector = DuplicateDetector::new(".", true);
//! if detector.detect(true).is_ok() {
//!     let result = delete_batch(detector.junk(), &DeleteConfig::default(), None);
//!     println!("{}", result.summary());
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::analysis::human_size;
use crate::scanner::FileRecord;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (already deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Attempted to delete all copies (at least one must be preserved).
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

/// Results of a batch deletion.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Files removed by this batch.
    pub successes: Vec<DeleteResult>,
    /// Files that were already gone when their turn came.
    pub already_absent: Vec<PathBuf>,
    /// Failed deletions with their error messages.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Files that are gone after the batch, removed or already absent.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len() + self.already_absent.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of files the batch attempted.
    #[must_use]
    pub fn attempted_count(&self) -> usize {
        self.success_count() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary, e.g. `deleted 3 of 4 files, freed 1.98 KB`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "deleted {} of {} files, freed {}",
            self.success_count(),
            self.attempted_count(),
            human_size(self.bytes_freed)
        );
        if !self.already_absent.is_empty() {
            summary.push_str(&format!(" ({} already absent)", self.already_absent.len()));
        }
        summary
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Move files to the system trash instead of removing them.
    pub use_trash: bool,
    /// Process remaining files even if some fail.
    pub continue_on_error: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            use_trash: false,
            continue_on_error: true,
        }
    }
}

impl DeleteConfig {
    /// Config for moving files to the trash.
    #[must_use]
    pub fn trash() -> Self {
        Self {
            use_trash: true,
            ..Self::default()
        }
    }

    /// Enable/disable continue on error.
    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called before each file deletion.
    fn on_before_delete(&self, path: &Path, index: usize, total: usize);

    /// Called after successful deletion.
    fn on_delete_success(&self, path: &Path, size: u64);

    /// Called when a file was already gone.
    fn on_already_absent(&self, _path: &Path) {}

    /// Called after failed deletion.
    fn on_delete_failure(&self, path: &Path, error: &str);

    /// Called when batch operation completes.
    fn on_complete(&self, result: &BatchDeleteResult);
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if its metadata can't be read
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: false,
    })
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `Io` for any other failure
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: true,
    })
}

/// Delete the file behind `record` as configured.
///
/// # Errors
///
/// See [`permanent_delete`] and [`delete_to_trash`].
pub fn delete_record(record: &FileRecord, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    if config.use_trash {
        delete_to_trash(&record.full_path)
    } else {
        permanent_delete(&record.full_path)
    }
}

impl FileRecord {
    /// Permanently remove this file from disk.
    ///
    /// # Errors
    ///
    /// Fails when the file is already gone or cannot be removed.
    pub fn delete(&self) -> Result<(), DeleteError> {
        permanent_delete(&self.full_path).map(|_| ())
    }
}

/// Delete multiple records in order.
///
/// Files that no longer exist go into [`BatchDeleteResult::already_absent`].
/// Other failures are recorded and, unless `continue_on_error` is off, the
/// batch moves on to the next record.
#[must_use]
pub fn delete_batch(
    records: &[FileRecord],
    config: &DeleteConfig,
    callback: Option<&dyn DeleteProgressCallback>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();
    let total = records.len();

    log::info!(
        "Deleting {} files ({})",
        total,
        if config.use_trash { "trash" } else { "permanent" }
    );

    for (index, record) in records.iter().enumerate() {
        let path = record.full_path.as_path();
        if let Some(cb) = callback {
            cb.on_before_delete(path, index, total);
        }

        match delete_record(record, config) {
            Ok(del) => {
                result.bytes_freed += del.size;
                if let Some(cb) = callback {
                    cb.on_delete_success(path, del.size);
                }
                result.successes.push(del);
            }
            Err(DeleteError::NotFound(_)) => {
                log::warn!("Already absent: {}", path.display());
                if let Some(cb) = callback {
                    cb.on_already_absent(path);
                }
                result.already_absent.push(path.to_path_buf());
            }
            Err(e) => {
                let error_msg = e.to_string();
                log::warn!("Failed to delete {}: {}", path.display(), error_msg);

                if let Some(cb) = callback {
                    cb.on_delete_failure(path, &error_msg);
                }

                result.failures.push((path.to_path_buf(), error_msg));

                if !config.continue_on_error {
                    log::info!("Stopping batch deletion due to error (continue_on_error=false)");
                    break;
                }
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_complete(&result);
    }

    log::info!("{}", result.summary());

    result
}

/// Validate that a selection doesn't delete all copies of a group.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if no member of `group_paths` survives.
///
/// # Example
///
/// ```
/// use dupecat::actions::delete::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![PathBuf::from("/original.txt"), PathBuf::from("/copy.txt")];
///
/// assert!(validate_preserves_copy(&group[1..], &group).is_ok());
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), DeleteError> {
    let selected_set: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved_count = group_paths
        .iter()
        .filter(|p| !selected_set.contains(p))
        .count();

    if preserved_count == 0 {
        log::error!(
            "Attempted to delete all {} copies of a duplicate group",
            group_paths.len()
        );
        Err(DeleteError::AllCopiesWouldBeDeleted)
    } else {
        log::debug!(
            "Deletion validated: {} files selected, {} preserved",
            selected_paths.len(),
            preserved_count
        );
        Ok(())
    }
}
