//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (the size index)
//! - Prefix fingerprint grouping (the hash index)
//! - The [`DuplicateDetector`] that runs both and partitions junk from keepers

pub mod finder;
pub mod groups;

pub use finder::{
    by_hash_index, DetectError, DetectorConfig, DetectorState, DuplicateDetector, HashConfig,
    HashStats, IndexSource, DEFAULT_WORKERS, MAX_WORKERS,
};
pub use groups::{by_size_index, DuplicateGroup, GroupIndex, GroupingStats, HashIndex, SizeIndex};
