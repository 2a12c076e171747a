//! Error taxonomy.
//!
//! Two layers:
//! - [`StoreError`]: what a storage engine or collaborator can fail with.
//! - [`PageError`]: what an operation reports to its caller. Every
//!   `StoreError` surfaces as [`PageError::Internal`].
//!
//! A version conflict is not an error; it is a [`crate::SaveOutcome`].

use thiserror::Error;
use uuid::Uuid;

/// Storage-engine failures.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// RocksDB internal error
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// Serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    /// Compression error
    #[error("Compression error: {0}")]
    CompressionError(String),
    /// An external collaborator (hierarchy service) failed
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),
    /// Engine lock poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

/// Operation-level errors.
#[derive(Debug, Clone, Error)]
pub enum PageError {
    /// Page absent, or not accessible to the caller
    #[error("Page not found: {0}")]
    NotFound(Uuid),
    /// Revision absent, or its page not accessible to the caller
    #[error("Revision not found: {0}")]
    RevisionNotFound(Uuid),
    /// Caller identity could not be established
    #[error("Unauthorized: caller identity could not be established")]
    Unauthorized,
    /// Request rejected before touching storage
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Storage-layer failure; no partial mutation was committed
    #[error("Internal error: {0}")]
    Internal(#[from] StoreError),
}
