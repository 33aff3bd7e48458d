//! File actions module.
//!
//! The delete module removes junk files found by the detector:
//! - Permanent deletion (default)
//! - Move to system trash (recoverable)
//! - Batch operations with progress reporting
//!
//! ```no_run
//! use dupecat::actions::delete::permanent_delete;
//! use std::path::Path;
//!
//! let result = permanent_delete(Path::new("/path/to/duplicate.txt"));
//! ```

pub mod delete;

pub use delete::{
    delete_batch, delete_record, delete_to_trash, permanent_delete, validate_preserves_copy,
    BatchDeleteResult, DeleteConfig, DeleteError, DeleteProgressCallback, DeleteResult,
};
