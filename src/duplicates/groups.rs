//! Order-preserving group indices.
//!
//! # Overview
//!
//! A [`GroupIndex`] maps a key (byte size or fingerprint) to the records that
//! share it. Groups keep the order in which their key was first seen, and
//! records keep the order in which they were inserted. Singleton groups are
//! pruned as soon as the index is populated, so every retained group has at
//! least two members.
//!
//! Insertion order matters: the first member of a group is the copy that is
//! kept, every later member is junk.
//!
//! # Example
//!
//! ```
//! use dupecat::scanner::FileRecord;
//! use dupecat::duplicates::by_size_index;
//!
//! let files = vec![
//!     FileRecord::new("/", "a.txt", 100),
//!     FileRecord::new("/", "b.txt", 100),
//!     FileRecord::new("/", "c.txt", 200),
//! ];
//!
//! let (index, stats) = by_size_index(&files);
//!
//! assert_eq!(index.len(), 1);
//! assert_eq!(index.get(&100).unwrap().len(), 2);
//! assert_eq!(stats.eliminated_unique, 1);
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::scanner::{FileRecord, Hash};

/// Records grouped by a key, groups of one removed.
#[derive(Debug, Clone)]
pub struct GroupIndex<K> {
    groups: Vec<(K, Vec<FileRecord>)>,
}

/// Records grouped by exact byte size.
pub type SizeIndex = GroupIndex<u64>;

/// Records grouped by prefix fingerprint.
pub type HashIndex = GroupIndex<Hash>;

impl<K> Default for GroupIndex<K> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<K: Copy + Eq + std::hash::Hash> GroupIndex<K> {
    /// Build an index from `(key, record)` pairs.
    ///
    /// Returns the pruned index together with statistics about what was
    /// eliminated.
    #[must_use]
    pub fn from_keyed(pairs: impl IntoIterator<Item = (K, FileRecord)>) -> (Self, GroupingStats) {
        let mut stats = GroupingStats::default();
        let mut positions: HashMap<K, usize> = HashMap::new();
        let mut groups: Vec<(K, Vec<FileRecord>)> = Vec::new();

        for (key, record) in pairs {
            stats.total_files += 1;
            stats.total_size += record.size;
            match positions.entry(key) {
                Entry::Occupied(slot) => groups[*slot.get()].1.push(record),
                Entry::Vacant(slot) => {
                    slot.insert(groups.len());
                    groups.push((key, vec![record]));
                }
            }
        }

        stats.unique_keys = groups.len();

        groups.retain(|(_, files)| {
            if files.len() > 1 {
                stats.potential_duplicates += files.len();
                stats.duplicate_groups += 1;
                true
            } else {
                stats.eliminated_unique += 1;
                log::trace!("Eliminated unique key: {}", files[0].full_path.display());
                false
            }
        });

        (Self { groups }, stats)
    }

    /// Records sharing `key`, if that key has a retained group.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&[FileRecord]> {
        self.groups
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, files)| files.as_slice())
    }
}

impl<K> GroupIndex<K> {
    /// Number of retained groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no group survived pruning.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over `(key, members)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[FileRecord])> {
        self.groups.iter().map(|(k, files)| (k, files.as_slice()))
    }

    /// Iterate over every member of every group, group by group.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.groups.iter().flat_map(|(_, files)| files.iter())
    }

    /// Total number of records across all groups.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|(_, files)| files.len()).sum()
    }

    /// Member count of the largest group, zero for an empty index.
    #[must_use]
    pub fn largest_group(&self) -> usize {
        self.groups
            .iter()
            .map(|(_, files)| files.len())
            .max()
            .unwrap_or(0)
    }

    /// Flattened membership, group by group.
    #[must_use]
    pub fn flatten(&self) -> Vec<FileRecord> {
        self.records().cloned().collect()
    }

    /// Every member except the first of each group.
    #[must_use]
    pub fn junk(&self) -> Vec<FileRecord> {
        self.groups
            .iter()
            .flat_map(|(_, files)| files.iter().skip(1))
            .cloned()
            .collect()
    }

    /// Borrowed views of the groups as duplicate sets.
    #[must_use]
    pub fn duplicate_groups(&self) -> Vec<DuplicateGroup<'_>> {
        self.groups
            .iter()
            .map(|(_, files)| DuplicateGroup { files })
            .collect()
    }
}

/// Group records by exact byte size (the size index).
///
/// Pure: no I/O is performed. Records keep their input order within each
/// group.
#[must_use]
pub fn by_size_index(records: &[FileRecord]) -> (SizeIndex, GroupingStats) {
    let (index, stats) = GroupIndex::from_keyed(records.iter().map(|r| (r.size, r.clone())));

    for (size, files) in index.iter() {
        log::debug!("Size group {} bytes: {} candidates", size, files.len());
    }
    log::info!(
        "Size index: {} files → {} candidates in {} groups ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.duplicate_groups,
        stats.elimination_rate()
    );

    (index, stats)
}

/// A duplicate set: the first member is kept, the rest are junk.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateGroup<'a> {
    /// Members in insertion order
    pub files: &'a [FileRecord],
}

impl<'a> DuplicateGroup<'a> {
    /// The kept original.
    #[must_use]
    pub fn keep(&self) -> Option<&'a FileRecord> {
        self.files.first()
    }

    /// Every member after the first.
    #[must_use]
    pub fn junk(&self) -> &'a [FileRecord] {
        self.files.get(1..).unwrap_or(&[])
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Byte size shared by the members (size of the kept copy).
    #[must_use]
    pub fn size(&self) -> u64 {
        self.keep().map_or(0, |f| f.size)
    }

    /// Bytes freed by removing the junk members.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.junk().iter().map(|f| f.size).sum()
    }
}

/// Statistics from building a group index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of records inserted
    pub total_files: usize,
    /// Total size of all inserted records in bytes
    pub total_size: u64,
    /// Number of distinct keys before pruning
    pub unique_keys: usize,
    /// Number of records in retained groups
    pub potential_duplicates: usize,
    /// Number of singleton groups pruned
    pub eliminated_unique: usize,
    /// Number of retained groups
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of records eliminated by pruning.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            let eliminated = self.total_files - self.potential_duplicates;
            (eliminated as f64 / self.total_files as f64) * 100.0
        }
    }
}
