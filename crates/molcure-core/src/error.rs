//! Error types for molcure-core
//!
//! Two families: [`RecordError`] describes a single input line that could
//! not be used and is absorbed by the curation loop, while [`CurationError`]
//! ends a run.

use std::path::PathBuf;

use thiserror::Error;

use crate::canonical::CanonicalFormError;
use crate::config::ConfigError;

/// Result type alias for curation operations
pub type Result<T> = std::result::Result<T, CurationError>;

/// Identifier used when a record's external id could not be extracted
pub const UNIDENTIFIED: &str = "[unidentified]";

/// Fatal errors that end a curation run
#[derive(Error, Debug)]
pub enum CurationError {
    /// A declared input file does not exist
    #[error("Input file not found: {}", .0.display())]
    MissingInputFile(PathBuf),

    /// An input stream failed mid-read
    #[error("Failed to read {source_name}: {source}")]
    InputRead {
        source_name: String,
        source: std::io::Error,
    },

    /// The curated output or the summary could not be persisted
    #[error("Failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid run configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Classification of a recovered per-record failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordErrorKind {
    Malformed,
    Parse,
    Canonicalization,
}

/// A record that could not be turned into a canonical key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The line could not be split into the expected fields
    #[error("Malformed record: {reason}")]
    Malformed { id: Option<String>, reason: String },

    /// The structure notation could not be parsed
    #[error("Parse error: {message}")]
    Parse { id: String, message: String },

    /// The structure parsed but could not be normalized
    #[error("Canonicalization error: {message}")]
    Canonicalization { id: String, message: String },
}

impl RecordError {
    pub(crate) fn malformed(id: Option<&str>, reason: impl Into<String>) -> Self {
        RecordError::Malformed {
            id: id.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Attach the record's identifier to a canonicalizer failure.
    pub fn from_canonical(error: CanonicalFormError, id: &str) -> Self {
        match error {
            CanonicalFormError::Parse(message) => RecordError::Parse {
                id: id.to_string(),
                message,
            },
            CanonicalFormError::Canonicalization(message) => RecordError::Canonicalization {
                id: id.to_string(),
                message,
            },
        }
    }

    pub fn kind(&self) -> RecordErrorKind {
        match self {
            RecordError::Malformed { .. } => RecordErrorKind::Malformed,
            RecordError::Parse { .. } => RecordErrorKind::Parse,
            RecordError::Canonicalization { .. } => RecordErrorKind::Canonicalization,
        }
    }

    /// Best-known identifier of the failing record, or [`UNIDENTIFIED`].
    pub fn identifier(&self) -> &str {
        match self {
            RecordError::Malformed { id, .. } => id.as_deref().unwrap_or(UNIDENTIFIED),
            RecordError::Parse { id, .. } | RecordError::Canonicalization { id, .. } => id,
        }
    }
}
