use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors raised by a sweep.
///
/// `InvalidPath` and `ProtectedPath` abort the whole sweep before anything
/// is touched. `StatFailed` and `DeleteFailed` belong to a single entry;
/// the sweeper records them in the report and keeps going.
/// The CLI layer wraps all of these in `anyhow`.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// Target directory is missing, not a directory, or unreadable
    #[error("Invalid sweep directory '{}': {source}", path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Target directory is on the protected list
    #[error("Refusing to sweep protected path: '{}'", path.display())]
    ProtectedPath { path: PathBuf },

    /// Metadata of one entry could not be read
    #[error("Failed to read metadata of '{}': {source}", path.display())]
    StatFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One entry could not be removed
    #[error("Failed to remove '{}': {source}", path.display())]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Kind of a recorded per-entry failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    StatFailed,
    DeleteFailed,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::StatFailed => write!(f, "stat_failed"),
            FailureKind::DeleteFailed => write!(f, "delete_failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_is_kept() {
        use std::error::Error;
        let err = SweepError::InvalidPath {
            path: PathBuf::from("/nope"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/nope"));
    }

    #[test]
    fn test_display_names_path() {
        let err = SweepError::ProtectedPath {
            path: PathBuf::from("/"),
        };
        assert!(err.to_string().contains("'/'"));
    }
}
