//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! The [`Walker`] lists the regular, non-empty files under a root directory.
//! In recursive mode it walks the whole tree depth-first; otherwise it only
//! lists the root's immediate children. Children of every directory are
//! visited sorted by file name, so repeated scans of an unchanged tree yield
//! identical, identically ordered results.
//!
//! # Filtering
//!
//! - Directories are never emitted; symlinked directories are not followed
//! - Symlinked files count as files if their target is a regular file
//! - Zero-byte files are skipped
//! - Hidden entries are skipped when [`WalkerConfig::skip_hidden`] is set,
//!   and hidden directories are pruned
//!
//! # Example
//!
//! ```no_run
//! use dupecat::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::new(false));
//! match walker.scan() {
//!     Ok(files) => println!("Found {} files", files.len()),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{FileRecord, ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Scan `root` with default filtering for the given recursion mode.
///
/// # Errors
///
/// See [`Walker::scan`].
pub fn scan(root: &Path, recursive: bool) -> Result<Vec<FileRecord>, ScanError> {
    Walker::new(root, WalkerConfig::new(recursive)).scan()
}

/// Directory walker producing [`FileRecord`]s.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set the walk stops at the next entry and
    /// [`Walker::scan`] reports [`ScanError::Interrupted`].
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Verify the root exists and is a directory.
    fn validate_root(&self) -> Result<(), ScanError> {
        match std::fs::metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::NotADirectory(self.root.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ScanError::PathNotFound(self.root.clone()))
            }
            Err(e) => Err(ScanError::Io {
                path: self.root.clone(),
                source: e,
            }),
        }
    }

    /// Walk the tree and collect every eligible file.
    ///
    /// Per-entry failures (an entry that vanished between listing and stat,
    /// an unreadable subdirectory) are logged and skipped.
    ///
    /// # Errors
    ///
    /// - [`ScanError::PathNotFound`] / [`ScanError::NotADirectory`] before
    ///   any traversal happens
    /// - [`ScanError::NoFilesFound`] when nothing eligible was found
    /// - [`ScanError::Interrupted`] when the shutdown flag was raised
    pub fn scan(&self) -> Result<Vec<FileRecord>, ScanError> {
        self.validate_root()?;

        log::info!(
            "Scanning {} ({})",
            self.root.display(),
            if self.config.recursive {
                "recursive"
            } else {
                "top level only"
            }
        );

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("scan", 0);
        }

        let mut files = Vec::new();
        let mut skipped = 0usize;
        for result in self.walk() {
            match result {
                Ok(record) => {
                    files.push(record);
                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(files.len(), &files[files.len() - 1].name);
                    }
                }
                Err(e) => {
                    skipped += 1;
                    log::warn!("Skipping entry: {}", e);
                }
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("scan");
        }

        if self.is_shutdown_requested() {
            log::info!("Scan interrupted after {} files", files.len());
            return Err(ScanError::Interrupted);
        }

        log::info!(
            "Scan complete: {} files ({} entries skipped)",
            files.len(),
            skipped
        );

        if files.is_empty() {
            return Err(ScanError::NoFilesFound(self.root.clone()));
        }

        Ok(files)
    }

    /// Walk the tree, yielding file records lazily.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping the
    /// iteration, and left to the caller to report. Files that vanish between listing and stat are dropped
    /// silently.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let max_depth = if self.config.recursive { usize::MAX } else { 1 };

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(self.config.skip_hidden)
            .max_depth(max_depth)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .take_while(move |_| {
                let stop = self.is_shutdown_requested();
                if stop {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                }
                !stop
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    if entry.depth == 0 || entry.file_type().is_dir() {
                        return None;
                    }
                    self.process_entry(entry.path())
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(ScanError::Io {
                        path,
                        source: std::io::Error::other(e.to_string()),
                    }))
                }
            })
    }

    /// Stat a non-directory entry and build its record if eligible.
    fn process_entry(&self, path: PathBuf) -> Option<Result<FileRecord, ScanError>> {
        // Follows symlinks: a link to a regular file counts as that file
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("File vanished before stat: {}", path.display());
                return None;
            }
            Err(e) => {
                return Some(Err(ScanError::Io { path, source: e }));
            }
        };

        if !metadata.is_file() {
            log::trace!("Skipping non-regular entry: {}", path.display());
            return None;
        }

        let size = metadata.len();
        if size == 0 {
            log::debug!("Skipping empty file: {}", path.display());
            return None;
        }

        Some(Ok(FileRecord::from_path(&path, size)))
    }
}
