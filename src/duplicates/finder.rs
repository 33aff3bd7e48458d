//! Duplicate detector with two-phase indexing.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Scan**: collect regular, non-empty files (see [`crate::scanner::walker`])
//! 2. **Size index**: group files by exact size (see [`crate::duplicates::groups`])
//! 3. **Hash index**: fingerprint the size candidates on a bounded pool and
//!    group them by fingerprint
//!
//! Fingerprinting fans out over a dedicated rayon pool and joins before any
//! grouping happens. The results come back index-aligned with the candidate
//! list, and the hash index is filled by walking that list in order, so group
//! membership order never depends on which worker finished first.
//!
//! # Example
//!
//! ```no_run
//! use dupecat::duplicates::{DetectError, DuplicateDetector};
//!
//! let mut detector = DuplicateDetector::new(".", true);
//! match detector.detect(true) {
//!     Ok(duplicates) => println!("{} duplicate files", duplicates.len()),
//!     Err(DetectError::NoFilesFound(_)) => println!("Nothing to scan"),
//!     Err(DetectError::NoDuplicatesFound) => println!("No duplicates"),
//!     Err(e) => eprintln!("{}", e),
//! }
//! for junk in detector.junk() {
//!     println!("junk: {}", junk.full_path.display());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::groups::{by_size_index, DuplicateGroup, GroupIndex, HashIndex, SizeIndex};
use crate::analysis::{analyse, Analysis};
use crate::progress::ProgressCallback;
use crate::scanner::{FileRecord, Fingerprinter, HashError, ScanError, Walker, WalkerConfig};

/// Default number of fingerprint workers.
pub const DEFAULT_WORKERS: usize = 10;

/// Upper bound on fingerprint workers, keeps open file handles bounded.
pub const MAX_WORKERS: usize = 64;

/// Configuration for the hash phase.
#[derive(Clone)]
pub struct HashConfig {
    /// Number of fingerprint workers.
    pub workers: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("workers", &self.workers)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HashConfig {
    /// Set the worker count, clamped to `1..=MAX_WORKERS`.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_WORKERS);
        self
    }

    /// Set the shutdown flag for graceful termination.
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

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the hash phase.
#[derive(Debug, Default)]
pub struct HashStats {
    /// Records that entered the hash phase
    pub input_files: usize,
    /// Records fingerprinted successfully
    pub hashed_files: usize,
    /// Records dropped because they could not be read
    pub failed_files: usize,
    /// The per-file errors behind `failed_files`
    pub errors: Vec<HashError>,
    /// Records whose fingerprint turned out unique
    pub unique_fingerprints: usize,
    /// Number of fingerprint groups with 2+ records
    pub duplicate_groups: usize,
    /// Whether the phase was cut short by the shutdown flag
    pub interrupted: bool,
}

/// Build a bounded pool for fingerprint workers.
///
/// Falls back to the global rayon pool if the dedicated pool cannot be built.
fn build_pool(workers: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("dupecat-hash-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!(
                "Failed to create fingerprint pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            None
        }
    }
}

/// Group records by fingerprint (the hash index).
///
/// Every input record is fingerprinted on a pool of `config.workers`
/// threads. Records that cannot be read are dropped and counted in the
/// returned stats. The input should be the flattened size index; feeding the
/// whole file list works but fingerprints files that cannot have duplicates.
#[must_use]
pub fn by_hash_index(
    records: Vec<FileRecord>,
    fingerprinter: &Fingerprinter,
    config: &HashConfig,
) -> (HashIndex, HashStats) {
    let mut stats = HashStats {
        input_files: records.len(),
        ..Default::default()
    };

    if records.is_empty() {
        log::debug!("Hash index: No files to process");
        return (HashIndex::default(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("fingerprint", records.len());
    }

    log::info!(
        "Fingerprinting {} files with {} workers",
        records.len(),
        config.workers
    );

    let completed = AtomicUsize::new(0);
    let fingerprint_all = || -> Vec<Option<Result<crate::scanner::Hash, HashError>>> {
        records
            .par_iter()
            .map(|record| {
                if config.is_shutdown_requested() {
                    return None;
                }
                let result = fingerprinter.fingerprint(record);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(done, &record.name);
                }
                Some(result)
            })
            .collect()
    };

    // Join barrier: every fingerprint is resolved before grouping starts
    let results = match build_pool(config.workers) {
        Some(pool) => pool.install(fingerprint_all),
        None => fingerprint_all(),
    };

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("fingerprint");
    }

    if config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Hash index: Interrupted by shutdown signal");
    }

    let mut keyed = Vec::with_capacity(records.len());
    for (mut record, result) in records.into_iter().zip(results) {
        match result {
            Some(Ok(hash)) => {
                stats.hashed_files += 1;
                record.set_fingerprint(hash);
                keyed.push((hash, record));
            }
            Some(Err(e)) => {
                log::warn!("Dropping {}: {}", record.full_path.display(), e);
                stats.failed_files += 1;
                stats.errors.push(e);
            }
            None => {}
        }
    }

    let (index, grouping) = GroupIndex::from_keyed(keyed);
    stats.unique_fingerprints = grouping.eliminated_unique;
    stats.duplicate_groups = grouping.duplicate_groups;

    for (hash, files) in index.iter() {
        log::debug!(
            "Fingerprint group {}: {} files",
            crate::scanner::hash_to_hex(hash),
            files.len()
        );
    }

    log::info!(
        "Hash index: {} files → {} duplicate groups ({} unique, {} unreadable)",
        stats.input_files,
        stats.duplicate_groups,
        stats.unique_fingerprints,
        stats.failed_files
    );

    (index, stats)
}

// ============================================================================
// DuplicateDetector - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate detector.
#[derive(Clone)]
pub struct DetectorConfig {
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Number of fingerprint workers.
    pub workers: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("walker_config", &self.walker_config)
            .field("workers", &self.workers)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DetectorConfig {
    /// Default configuration for the given recursion mode.
    #[must_use]
    pub fn new(recursive: bool) -> Self {
        Self {
            walker_config: WalkerConfig::new(recursive),
            workers: DEFAULT_WORKERS,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the fingerprint worker count, clamped to `1..=MAX_WORKERS`.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_WORKERS);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
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

    fn hash_config(&self) -> HashConfig {
        HashConfig {
            workers: self.workers,
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Progress of a detector through its phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DetectorState {
    /// Nothing has run yet
    Idle,
    /// The file list is available
    Scanned,
    /// The size index is built
    SizeIndexed,
    /// The hash index is built
    HashIndexed,
    /// A duplicate result is available
    Done,
}

/// Which index produced the duplicate result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexSource {
    /// Grouped by size only; distinct files can share a size
    Size,
    /// Grouped by size, then by prefix fingerprint
    Hash,
}

/// Errors and expected-empty outcomes of a detection run.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The directory holds no eligible files.
    #[error("No files found in {0}")]
    NoFilesFound(PathBuf),

    /// Files exist but none of them are duplicated.
    #[error("No duplicates found")]
    NoDuplicatesFound,

    /// The run was stopped by the shutdown flag.
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The root could not be read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl DetectError {
    /// Whether this is a "ran but found nothing" outcome rather than a failure.
    #[must_use]
    pub fn is_empty_outcome(&self) -> bool {
        matches!(self, Self::NoFilesFound(_) | Self::NoDuplicatesFound)
    }
}

impl From<ScanError> for DetectError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::PathNotFound(p) => Self::PathNotFound(p),
            ScanError::NotADirectory(p) => Self::NotADirectory(p),
            ScanError::NoFilesFound(p) => Self::NoFilesFound(p),
            ScanError::Interrupted => Self::Interrupted,
            ScanError::Io { path, source } => Self::Io { path, source },
        }
    }
}

/// Finds duplicate files under one root and partitions them into kept
/// originals and junk.
///
/// Each phase runs at most once per instance and its output stays available
/// for inspection. Calling [`detect`](Self::detect) again returns the cached
/// result without touching the filesystem.
///
/// # Example
///
/// ```no_run
/// use dupecat::duplicates::DuplicateDetector;
///
/// let mut detector = DuplicateDetector::new("/some/path", false);
/// if detector.detect(true).is_ok() {
///     if let Some(analysis) = detector.analyse() {
///         println!("Reclaimable: {}", analysis.reclaimable_display());
///     }
/// }
/// ```
pub struct DuplicateDetector {
    root: PathBuf,
    config: DetectorConfig,
    fingerprinter: Fingerprinter,
    state: DetectorState,
    files: Option<Vec<FileRecord>>,
    size_index: Option<SizeIndex>,
    hash_index: Option<HashIndex>,
    hash_stats: Option<HashStats>,
    source: Option<IndexSource>,
    duplicates: Vec<FileRecord>,
    junk: Vec<FileRecord>,
}

impl std::fmt::Debug for DuplicateDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateDetector")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("source", &self.source)
            .field("duplicates", &self.duplicates.len())
            .field("junk", &self.junk.len())
            .finish()
    }
}

impl DuplicateDetector {
    /// Create a detector for `root` with default settings.
    #[must_use]
    pub fn new(root: impl AsRef<Path>, recursive: bool) -> Self {
        Self::with_config(root, DetectorConfig::new(recursive))
    }

    /// Create a detector for `root` with the given configuration.
    #[must_use]
    pub fn with_config(root: impl AsRef<Path>, config: DetectorConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
            fingerprinter: Fingerprinter::new(),
            state: DetectorState::Idle,
            files: None,
            size_index: None,
            hash_index: None,
            hash_stats: None,
            source: None,
            duplicates: Vec::new(),
            junk: Vec::new(),
        }
    }

    /// Run the pipeline and return the duplicate records.
    ///
    /// With `use_hash` the size candidates are fingerprinted and grouped by
    /// fingerprint. Without it the size index is the result, which is less
    /// precise: two different files of equal size are reported as duplicates.
    ///
    /// # Errors
    ///
    /// - [`DetectError::PathNotFound`] / [`DetectError::NotADirectory`] for a
    ///   bad root, before anything is scanned
    /// - [`DetectError::NoFilesFound`] when there is nothing to scan
    /// - [`DetectError::NoDuplicatesFound`] when nothing is duplicated
    /// - [`DetectError::Interrupted`] when the shutdown flag was raised
    pub fn detect(&mut self, use_hash: bool) -> Result<&[FileRecord], DetectError> {
        let wanted = if use_hash {
            IndexSource::Hash
        } else {
            IndexSource::Size
        };
        if self.source == Some(wanted) {
            log::debug!("Reusing cached {:?} result", wanted);
            return Ok(&self.duplicates);
        }
        self.clear_result();

        if self.files.is_none() {
            let mut walker = Walker::new(&self.root, self.config.walker_config);
            if let Some(ref flag) = self.config.shutdown_flag {
                walker = walker.with_shutdown_flag(flag.clone());
            }
            if let Some(ref callback) = self.config.progress_callback {
                walker = walker.with_progress_callback(callback.clone());
            }
            self.files = Some(walker.scan()?);
            self.advance(DetectorState::Scanned);
        }

        if self.size_index.is_none() {
            let files = self.files.as_deref().unwrap_or_default();
            let (index, _) = by_size_index(files);
            self.size_index = Some(index);
            self.advance(DetectorState::SizeIndexed);
        }

        let size_groups = self.size_index.as_ref().map_or(0, GroupIndex::len);
        if size_groups == 0 {
            return Err(DetectError::NoDuplicatesFound);
        }

        if use_hash && self.hash_index.is_none() {
            let candidates = self
                .size_index
                .as_ref()
                .map(GroupIndex::flatten)
                .unwrap_or_default();
            let (index, stats) = by_hash_index(
                candidates,
                &self.fingerprinter,
                &self.config.hash_config(),
            );
            if stats.interrupted {
                return Err(DetectError::Interrupted);
            }
            self.hash_index = Some(index);
            self.hash_stats = Some(stats);
            self.advance(DetectorState::HashIndexed);
        }

        let (duplicates, junk) = match wanted {
            IndexSource::Hash => match self.hash_index.as_ref().filter(|i| !i.is_empty()) {
                Some(index) => (index.flatten(), index.junk()),
                None => return Err(DetectError::NoDuplicatesFound),
            },
            IndexSource::Size => match self.size_index.as_ref().filter(|i| !i.is_empty()) {
                Some(index) => (index.flatten(), index.junk()),
                None => return Err(DetectError::NoDuplicatesFound),
            },
        };

        self.duplicates = duplicates;
        self.junk = junk;
        self.source = Some(wanted);
        self.advance(DetectorState::Done);

        log::info!(
            "Detection complete: {} duplicate files, {} junk",
            self.duplicates.len(),
            self.junk.len()
        );

        Ok(&self.duplicates)
    }

    // A failed detect must not leave an earlier result behind for junk().
    fn clear_result(&mut self) {
        self.source = None;
        self.duplicates.clear();
        self.junk.clear();
    }

    fn advance(&mut self, state: DetectorState) {
        if state > self.state {
            log::debug!("Detector state {:?} → {:?}", self.state, state);
            self.state = state;
        }
    }

    /// Root directory this detector scans.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Which index produced the current result, if any.
    #[must_use]
    pub fn source(&self) -> Option<IndexSource> {
        self.source
    }

    /// Every scanned file, once the scan has run.
    #[must_use]
    pub fn files(&self) -> Option<&[FileRecord]> {
        self.files.as_deref()
    }

    /// The size index, once built.
    #[must_use]
    pub fn size_index(&self) -> Option<&SizeIndex> {
        self.size_index.as_ref()
    }

    /// The hash index, once built.
    #[must_use]
    pub fn hash_index(&self) -> Option<&HashIndex> {
        self.hash_index.as_ref()
    }

    /// Statistics of the hash phase, once run.
    #[must_use]
    pub fn hash_stats(&self) -> Option<&HashStats> {
        self.hash_stats.as_ref()
    }

    /// Duplicate records of the last successful [`detect`](Self::detect).
    #[must_use]
    pub fn duplicates(&self) -> &[FileRecord] {
        &self.duplicates
    }

    /// Junk records: every duplicate except the first of its group.
    ///
    /// Empty until [`detect`](Self::detect) has succeeded.
    #[must_use]
    pub fn junk(&self) -> &[FileRecord] {
        &self.junk
    }

    /// The duplicate sets behind the current result.
    #[must_use]
    pub fn groups(&self) -> Vec<DuplicateGroup<'_>> {
        match self.source {
            Some(IndexSource::Hash) => self
                .hash_index
                .as_ref()
                .map(GroupIndex::duplicate_groups)
                .unwrap_or_default(),
            Some(IndexSource::Size) => self
                .size_index
                .as_ref()
                .map(GroupIndex::duplicate_groups)
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Summarise the current result, `None` when there are no duplicates.
    #[must_use]
    pub fn analyse(&self) -> Option<Analysis> {
        let hash_index = match self.source {
            Some(IndexSource::Hash) => self.hash_index.as_ref(),
            _ => None,
        };
        analyse(
            &self.duplicates,
            &self.junk,
            self.size_index.as_ref(),
            hash_index,
        )
    }
}
