use std::path::PathBuf;

use cabbage_sync::SyncError;
use thiserror::Error;

/// Failures while handling one inbound message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// A command named a document that was never opened.
    #[error("document '{}' is not open", .0.display())]
    DocumentNotOpen(PathBuf),
    /// A command without a path arrived before any document was opened.
    #[error("no active document")]
    NoActiveDocument,
    /// The `data` of a widget update could not be decoded.
    #[error("invalid widget update: {0}")]
    InvalidPayload(String),
    /// The document could not be synchronized.
    #[error(transparent)]
    Sync(#[from] SyncError),
}
