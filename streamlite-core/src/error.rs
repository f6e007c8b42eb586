use std::path::PathBuf;

use thiserror::Error;

use crate::scanner::WalkError;

/// Errors raised by the catalog, the scanner and range handling.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The scan root is missing, unreadable or not a directory. Fatal to a
    /// scan; nothing is reconciled.
    #[error("Video root unavailable: {path}: {reason}")]
    RootUnavailable {
        /// Configured root.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A file or directory inside the tree could not be read.
    #[error("Cannot access {path}: {reason}")]
    EntryAccess {
        /// Entry that failed.
        path: PathBuf,
        /// Underlying I/O error.
        reason: String,
    },

    /// A symlink is dangling or its target cannot be read.
    #[error("Cannot resolve symlink {path}: {reason}")]
    SymlinkResolution {
        /// The link, not its target.
        path: PathBuf,
        /// Underlying I/O error.
        reason: String,
    },

    /// The catalog store rejected or failed an operation.
    #[error("Catalog store error: {0}")]
    Store(String),

    /// The catalog has a record whose file is gone.
    #[error("Video file missing on disk: {0}")]
    StreamTargetMissing(PathBuf),

    /// A `Range` header that cannot be satisfied.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// No record for the requested id or path.
    #[error("Media not found: {0}")]
    NotFound(String),

    /// Stopped by a cancellation token.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Anything else, such as a panicked worker task.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<WalkError> for MediaError {
    fn from(err: WalkError) -> Self {
        match err {
            WalkError::EntryAccess { path, source } => Self::EntryAccess {
                path,
                reason: source.to_string(),
            },
            WalkError::SymlinkResolution { path, source } => Self::SymlinkResolution {
                path,
                reason: source.to_string(),
            },
            WalkError::Cancelled => Self::Cancelled("directory walk".to_string()),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MediaError>;
