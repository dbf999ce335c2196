// In: src/error.rs

//! This module defines the single, unified error type for the hash-bucket stage.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! There is no partial-success mode: every variant is fatal for the task
//! invocation that produced it, and the orchestrator decides whether to retry.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BucketError {
    // =========================================================================
    // === High-Level, Semantic Errors
    // =========================================================================
    /// A caller-supplied argument is out of range (e.g. `num_buckets == 0`).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A column required by this stage is absent from a table.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A primary-key column holds a null. Rows are never silently dropped.
    #[error("Primary key column '{column}' has a null value at row {row}")]
    MissingPrimaryKeyValue { column: String, row: usize },

    /// The storage collaborator and the task plan disagree on file counts.
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    #[error("Unsupported content type for this reader: {0}")]
    UnsupportedContentType(String),

    #[error("Object store operation failed: {0}")]
    ObjectStore(String),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error surfaced by a storage collaborator, propagated unchanged.
    #[error("Storage operation failed: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while loading configuration.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl BucketError {
    /// Wraps an arbitrary collaborator error without altering it.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        BucketError::Storage(Box::new(err))
    }
}
