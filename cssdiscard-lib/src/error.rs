use std::path::PathBuf;
use thiserror::Error;

/// Error type user supplied predicates may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DiscardError {
    #[error("CSS parse error at line {line}, column {column}: {message}")]
    Parse {
        line: u32,
        column: u32,
        message: String,
    },

    /// The reference is neither parsable CSS nor an existing file.
    #[error("reference stylesheet is neither valid CSS nor an existing file: {0}")]
    ReferenceNotFound(#[source] Box<DiscardError>),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("pattern predicate failed: {0}")]
    Predicate(#[source] BoxError),
}
