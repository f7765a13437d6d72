//! Error types for the treeprint fingerprinting engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while computing a fingerprint
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// Root path does not exist or is neither a regular file nor a directory
    #[error("{} is not a valid path", .0.display())]
    InvalidPath(PathBuf),

    /// Algorithm identifier outside the supported set
    #[error("Unsupported algorithm: {0} (must be one of md5, sha1, sha256, sha512)")]
    UnsupportedAlgorithm(String),

    /// A file could not be opened or fully read while hashing
    #[error("Failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be listed during traversal
    #[error("Cannot access {}: {source}", path.display())]
    NotAccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fingerprint computation was cancelled")]
    Cancelled,

    #[error("Fingerprint computation timed out after {0:?}")]
    TimedOut(std::time::Duration),

    #[error("Hashing task failed: {0}")]
    TaskFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl FingerprintError {
    /// Whether this error concerns a single member of a directory scan.
    ///
    /// Skippable errors are recorded on the result and excluded from the
    /// digest; every other error aborts the computation.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            FingerprintError::ReadError { .. } | FingerprintError::NotAccessible { .. }
        )
    }

    /// Path the error refers to, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            FingerprintError::InvalidPath(path)
            | FingerprintError::ReadError { path, .. }
            | FingerprintError::NotAccessible { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for FingerprintError {
    fn from(err: config::ConfigError) -> Self {
        FingerprintError::ConfigError(err.to_string())
    }
}
