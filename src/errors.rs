use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in cryptkit.
#[derive(Debug, Error)]
pub enum CryptkitError {
    // --- Validation errors ---
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    // --- Crypto errors ---
    /// Wrong password or corrupted container. Deliberately carries no detail.
    #[error("Decryption failed — wrong password or corrupted data")]
    IntegrityFailure,

    #[error("Computation failed: {0}")]
    ComputationFailure(String),

    // --- IO errors ---
    #[error("IO error on {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The five failure classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    MissingParameter,
    IntegrityFailure,
    IoFailure,
    ComputationFailure,
}

impl CryptkitError {
    /// Classify this error into one of the five failure kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::MissingParameter(_) => ErrorKind::MissingParameter,
            Self::IntegrityFailure => ErrorKind::IntegrityFailure,
            Self::ComputationFailure(_) => ErrorKind::ComputationFailure,
            Self::IoFailure { .. } | Self::Io(_) => ErrorKind::IoFailure,
        }
    }

    /// Build a closure that attaches `path` to an `io::Error`.
    ///
    /// Meant for `map_err`: `fs::File::open(p).map_err(CryptkitError::at(p))?`.
    pub fn at(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::IoFailure {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Convenience type alias for cryptkit results.
pub type Result<T> = std::result::Result<T, CryptkitError>;
