//! Error types for history and storage operations

use thiserror::Error;

use crate::history::EntryId;

/// Errors returned by score history mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Input rejected before any state changed
    #[error("validation failed: {0}")]
    Validation(&'static str),
    /// Index does not address an entry of the unfiltered list
    #[error("no history entry at index {index} (history has {len} entries)")]
    IndexNotFound { index: usize, len: usize },
    /// Entry was deleted or never existed in this session
    #[error("no history entry with id {0}")]
    IdNotFound(EntryId),
}

/// Errors from the key-value storage backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("failed to write key {key}: {reason}")]
    WriteFailed { key: String, reason: String },
}
