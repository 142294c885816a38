//! Document synchronization errors.

use std::path::PathBuf;

use cabbage_widgets::RecordError;
use thiserror::Error;

/// Failures while reading or rewriting a `<Cabbage>` region.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// The document has no `<Cabbage>`/`</Cabbage>` pair.
    #[error("no <Cabbage> region found")]
    MissingRegion,

    /// The region content is not valid JSON.
    #[error("invalid JSON in <Cabbage> region: {0}")]
    InvalidJson(String),

    /// The region content is JSON but not an array.
    #[error("<Cabbage> region must contain a JSON array")]
    NotAnArray,

    /// An element of the region array is not a valid widget record.
    #[error("widget record {index} is invalid: {source}")]
    InvalidRecord { index: usize, source: RecordError },

    /// The linked external file could not be read or written.
    #[error("external file '{}': {message}", path.display())]
    ExternalIo { path: PathBuf, message: String },

    /// A single update or insert was rejected.
    #[error(transparent)]
    Rejected(#[from] RecordError),
}

impl SyncError {
    pub(crate) fn external(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        Self::ExternalIo {
            path: path.into(),
            message: error.to_string(),
        }
    }
}
