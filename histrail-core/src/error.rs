//! Error types for history log operations

use crate::ItemId;
use thiserror::Error;

/// Document store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Document not found: {id}")]
    NotFound { id: ItemId },

    #[error("Write failed for document {id}: {reason}")]
    WriteFailed { id: ItemId, reason: String },

    #[error("Document {id} has no {field} field")]
    MissingField { id: ItemId, field: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Entry codec errors. A line that fails to parse is kept verbatim as an
/// opaque line; these errors never abort a batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid timestamp prefix: {slice:?}")]
    InvalidTimestamp { slice: String },

    #[error("Missing item link token")]
    MissingItemLink,

    #[error("Invalid trail level token: {token:?}")]
    InvalidTrailLevel { token: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {reason}")]
    Parse { reason: String },
}

/// Visit queue errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Visit queue is closed")]
    Closed,

    #[error("Visit worker failed: {reason}")]
    WorkerFailed { reason: String },
}

/// Master error type for all histrail errors.
#[derive(Debug, Clone, Error)]
pub enum HistError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

impl HistError {
    /// Whether this error means the referenced document does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HistError::Storage(StorageError::NotFound { .. }))
    }
}

/// Result type alias for histrail operations.
pub type HistResult<T> = Result<T, HistError>;

// =============================================================================
// TESTS
// =============================================================================
