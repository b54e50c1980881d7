//! Error types for the anneal library.

use thiserror::Error;

use crate::attribute::TypeTag;

/// Main error type for anneal operations.
///
/// Soft failures (value coercion, row-width downgrades, best-effort type
/// adjustment) never surface here; they are logged and degrade to "missing"
/// or a wider column type instead.
#[derive(Debug, Error)]
pub enum AnnealError {
    /// A value was assigned to an attribute whose declared tag disagrees.
    #[error("type mismatch on '{attribute}': expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        attribute: String,
        expected: TypeTag,
        actual: TypeTag,
    },

    /// An attribute failed post-cleaning validation; aborts the batch.
    #[error("validation failed for attribute '{attribute}'")]
    ValidationFailure { attribute: String },

    /// A column's declared tag fits neither the numeric nor the categorical
    /// cleaning stream.
    #[error("unsupported column type {tag:?} for column '{column}'")]
    UnsupportedColumnType { column: String, tag: TypeTag },

    /// A non-numeric value reached the numeric pipeline.
    #[error("column '{column}' contains a non-numeric value")]
    NonNumericColumn { column: String },

    /// A non-string value reached the categorical pipeline.
    #[error("column '{column}' contains a non-string value")]
    NonStringColumn { column: String },

    /// `process_and_persist` was invoked with a zero slice size.
    #[error("batch size must be greater than zero")]
    InvalidBatchSize,

    /// Reading the schema catalog failed.
    #[error("schema introspection failed for `{statement}`: {message}")]
    SchemaIntrospection { statement: String, message: String },

    /// A DDL statement (CREATE/ALTER) failed.
    #[error("schema mutation failed for `{statement}`: {message}")]
    SchemaMutation { statement: String, message: String },

    /// The batch upsert statement failed.
    #[error("batch upsert failed for `{statement}`: {message}")]
    UpsertExecution { statement: String, message: String },

    /// Persisting one slice failed; earlier slices stay committed.
    #[error("failed to persist slice {slice}")]
    SlicePersistence {
        slice: usize,
        #[source]
        source: Box<AnnealError>,
    },

    /// Error from the underlying storage collaborator.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type alias for anneal operations.
pub type Result<T> = std::result::Result<T, AnnealError>;
