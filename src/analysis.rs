//! Summary statistics over a duplicate result.
//!
//! Everything here is pure aggregation over records that are already in
//! memory; nothing touches the filesystem.

use serde::Serialize;

use crate::duplicates::{HashIndex, SizeIndex};
use crate::scanner::FileRecord;

/// Summary of a duplicate search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Analysis {
    /// Number of duplicate records, kept copies included
    pub total_count: usize,
    /// Bytes freed by deleting every junk record
    pub reclaimable_bytes: u64,
    /// Member count of the largest duplicate set
    pub largest_group: usize,
}

impl Analysis {
    /// Reclaimable bytes as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        human_size(self.reclaimable_bytes)
    }
}

/// Summarise a duplicate result.
///
/// The largest group is taken from the hash index when it holds any group,
/// otherwise from the size index. Returns `None` when `duplicates` is empty.
#[must_use]
pub fn analyse(
    duplicates: &[FileRecord],
    junk: &[FileRecord],
    size_index: Option<&SizeIndex>,
    hash_index: Option<&HashIndex>,
) -> Option<Analysis> {
    if duplicates.is_empty() {
        return None;
    }

    let largest_group = match hash_index.filter(|index| !index.is_empty()) {
        Some(index) => index.largest_group(),
        None => size_index.map_or(0, SizeIndex::largest_group),
    };

    Some(Analysis {
        total_count: duplicates.len(),
        reclaimable_bytes: junk.iter().map(|f| f.size).sum(),
        largest_group,
    })
}

/// Format a byte count with binary (1024) scaling.
///
/// Picks the largest unit whose value is at least one. Plain bytes print as
/// an integer, every larger unit with two decimals. The whole part is
/// grouped by thousands.
///
/// ```
/// use dupecat::analysis::human_size;
///
/// assert_eq!(human_size(100), "100 B");
/// assert_eq!(human_size(2024), "1.98 KB");
/// ```
#[must_use]
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes < 1024 {
        return format!("{} B", group_thousands(&bytes.to_string()));
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let formatted = format!("{:.2}", value);
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    format!("{}.{} {}", group_thousands(whole), fraction, UNITS[unit])
}

/// Insert `,` between every group of three digits.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
