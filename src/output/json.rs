//! JSON output for duplicate search results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "source": "hash",
//!   "groups": [
//!     {
//!       "fingerprint": "9f2c...",
//!       "size": 1024,
//!       "keep": "/path/to/a.txt",
//!       "junk": ["/path/to/b.txt"]
//!     }
//!   ],
//!   "analysis": {
//!     "total_count": 2,
//!     "reclaimable_bytes": 1024,
//!     "largest_group": 2
//!   }
//! }
//! ```
//!
//! `fingerprint` is `null` when the search compared sizes only.

use std::io::Write;

use serde::Serialize;

use crate::analysis::Analysis;
use crate::duplicates::{DuplicateGroup, IndexSource};

/// A single duplicate set.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Shared fingerprint as hex, absent in size-only mode
    pub fingerprint: Option<String>,
    /// File size in bytes
    pub size: u64,
    /// The kept file
    pub keep: String,
    /// Every other member
    pub junk: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Convert a borrowed group view.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup<'_>) -> Self {
        let keep = group.keep();
        Self {
            fingerprint: keep
                .and_then(|f| f.fingerprint())
                .map(crate::scanner::hash_to_hex),
            size: group.size(),
            keep: keep
                .map(|f| f.full_path.to_string_lossy().into_owned())
                .unwrap_or_default(),
            junk: group
                .junk()
                .iter()
                .map(|f| f.full_path.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Which index produced the groups
    pub source: IndexSource,
    /// Duplicate sets in detection order
    pub groups: Vec<JsonDuplicateGroup>,
    /// Summary, absent when there are no duplicates
    pub analysis: Option<Analysis>,
}

impl JsonOutput {
    /// Build the document from groups and their analysis.
    #[must_use]
    pub fn new(groups: &[DuplicateGroup<'_>], source: IndexSource, analysis: Option<Analysis>) -> Self {
        Self {
            source,
            groups: groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            analysis,
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON output: {0}")]
    Io(#[from] std::io::Error),
}
