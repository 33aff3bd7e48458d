//! Bounded-prefix content fingerprints.
//!
//! # Overview
//!
//! A fingerprint is a keyed BLAKE3 digest over at most the first
//! [`PREFIX_SIZE`] bytes of a file. The key is derived from the file size, so
//! two files of different sizes never share a fingerprint even when their
//! prefixes are identical.
//!
//! Only the prefix is read. Two same-size files that agree on their first
//! 1024 bytes and differ later get the same fingerprint; this is accepted in
//! exchange for constant per-file I/O.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{FileRecord, HashError};

/// A 32-byte fingerprint.
pub type Hash = [u8; 32];

/// Number of leading bytes read from each file.
pub const PREFIX_SIZE: usize = 1024;

/// Context string for deriving the per-size key. Changing it changes every
/// fingerprint.
const KEY_CONTEXT: &str = "dupecat 2024-06-01 size-keyed prefix fingerprint v1";

/// Derive the 32-byte hashing key for files of `size` bytes.
#[must_use]
pub fn size_key(size: u64) -> [u8; 32] {
    blake3::derive_key(KEY_CONTEXT, size.to_string().as_bytes())
}

/// Fingerprint an in-memory prefix for a file of `size` bytes.
#[must_use]
pub fn fingerprint_bytes(prefix: &[u8], size: u64) -> Hash {
    *blake3::keyed_hash(&size_key(size), prefix).as_bytes()
}

/// Render a fingerprint as lowercase hex.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Computes prefix fingerprints for discovered files.
///
/// Each call opens its own handle, reads at most `prefix_size` bytes and
/// closes it again. The file is never written.
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter {
    prefix_size: usize,
}

impl Fingerprinter {
    /// Create a fingerprinter reading [`PREFIX_SIZE`] bytes per file.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix_size: PREFIX_SIZE,
        }
    }

    /// Number of bytes read per file.
    #[must_use]
    pub fn prefix_size(&self) -> usize {
        self.prefix_size
    }

    /// Fingerprint the file behind `record`, keyed by its recorded size.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the file can no longer be opened or read.
    /// Callers drop the record in that case.
    pub fn fingerprint(&self, record: &FileRecord) -> Result<Hash, HashError> {
        self.fingerprint_path(&record.full_path, record.size)
    }

    /// Fingerprint the file at `path` using `size` as key material.
    ///
    /// Files shorter than the prefix are hashed over their whole content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] on open or read failure.
    pub fn fingerprint_path(&self, path: &Path, size: u64) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;

        let mut prefix = Vec::with_capacity(self.prefix_size);
        file.take(self.prefix_size as u64)
            .read_to_end(&mut prefix)
            .map_err(|e| HashError::from_io(path, e))?;

        log::trace!(
            "Fingerprinted {} bytes of {}",
            prefix.len(),
            path.display()
        );

        Ok(fingerprint_bytes(&prefix, size))
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}
