//! Exit codes and structured error output.

use serde::Serialize;

use crate::duplicates::DetectError;

/// Process exit codes.
///
/// - 0: duplicates found (or the command completed)
/// - 1: unexpected failure
/// - 2: files were scanned but none are duplicated
/// - 3: nothing eligible to scan
/// - 4: the path is missing or not a directory
/// - 130: interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Completed normally.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// The directory held no eligible files.
    NoFiles = 3,
    /// The path does not exist or is not a directory.
    InvalidPath = 4,
    /// Interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DC000",
            Self::GeneralError => "DC001",
            Self::NoDuplicates => "DC002",
            Self::NoFiles => "DC003",
            Self::InvalidPath => "DC004",
            Self::Interrupted => "DC130",
        }
    }

    /// Exit code for a detection outcome.
    #[must_use]
    pub fn from_detect_error(err: &DetectError) -> Self {
        match err {
            DetectError::PathNotFound(_) | DetectError::NotADirectory(_) => Self::InvalidPath,
            DetectError::NoFilesFound(_) => Self::NoFiles,
            DetectError::NoDuplicatesFound => Self::NoDuplicates,
            DetectError::Interrupted => Self::Interrupted,
            DetectError::Io { .. } => Self::GeneralError,
        }
    }

    /// Exit code for an error that reached `main`.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        err.downcast_ref::<DetectError>()
            .map_or(Self::GeneralError, Self::from_detect_error)
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DC001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
