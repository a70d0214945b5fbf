//! Error types shared by the organizing engine.

use std::io;
use std::path::PathBuf;

/// Errors that can occur while organizing a directory.
///
/// Only [`OrganizeError::InvalidSourceDirectory`] and
/// [`OrganizeError::InvalidPattern`] abort a run. Every other variant is
/// attached to the entry it happened on and processing moves on.
#[derive(thiserror::Error, Debug)]
pub enum OrganizeError {
    /// The directory to organize is missing, not a directory, or unreadable.
    #[error("invalid source directory {}: {reason}", path.display())]
    InvalidSourceDirectory { path: PathBuf, reason: String },

    /// Failed to create a category directory.
    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Every `_copyN` candidate up to the probe limit is taken.
    #[error("too many collisions for {} (tried {attempts} alternatives)", path.display())]
    TooManyCollisions { path: PathBuf, attempts: usize },

    /// Failed to move a file to its destination.
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No creation-like timestamp could be read for a file.
    #[error("timestamp unavailable for {}: {source}", path.display())]
    TimestampUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An exclusion glob or regex failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl OrganizeError {
    pub fn invalid_source(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidSourceDirectory {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for organizing operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_failure_keeps_io_source() {
        use std::error::Error;

        let err = OrganizeError::MoveFailed {
            from: PathBuf::from("a.txt"),
            to: PathBuf::from("Documents/a.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert!(err.to_string().contains("Documents/a.txt"));
        assert!(err.source().is_some());

        let collisions = OrganizeError::TooManyCollisions {
            path: PathBuf::from("a.txt"),
            attempts: 1000,
        };
        assert!(collisions.to_string().contains("1000"));
        assert!(collisions.source().is_none());
    }

    #[test]
    fn test_display_includes_path() {
        let err = OrganizeError::invalid_source("/missing/dir", "does not exist");
        let message = err.to_string();
        assert!(message.contains("/missing/dir"));
        assert!(message.contains("does not exist"));
    }
}
