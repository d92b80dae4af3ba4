//! Report compilation and execution errors.

use thiserror::Error;

/// Errors raised while compiling or running a report.
///
/// Every variant is a caller mistake; none of them leave partial results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("baseEntity is required")]
    MissingBaseEntity,

    #[error("Join entity required")]
    MissingJoinEntity,

    #[error("Reference required")]
    EmptyReference,

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Duplicate join entity: {0}")]
    DuplicateJoinEntity(String),

    #[error("Join condition must be left=right, got '{0}'")]
    InvalidJoinCondition(String),

    #[error("Join right side must reference {expected}, got {found}")]
    JoinTargetMismatch { expected: String, found: String },

    #[error("Operator not allowed: {0}")]
    OperatorNotAllowed(String),

    #[error("Between requires two comma-separated values")]
    InvalidBetweenValue,

    #[error("Column not available: {entity}.{key}")]
    ColumnNotAvailable { entity: String, key: String },

    #[error("Invalid pagination: page={page}, size={size}")]
    InvalidPagination { page: i64, size: i64 },
}

pub type ReportResult<T> = Result<T, ReportError>;
