//! Crate-level error type.
//!
//! Each module reports its own error enum; [`Error`] wraps them so callers
//! that cross modules (the executor, the HTTP layer, the CLI) can use one
//! `Result` and classify failures with [`Error::kind`].

use thiserror::Error;

use crate::config::SettingsError;
use crate::metadata::MetadataError;
use crate::report::ReportError;
use crate::store::StoreError;
use crate::template::TemplateError;

/// How a failure should be reported to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was malformed or referenced something invalid.
    BadRequest,
    NotFound,
    /// A storage or serialization failure on our side.
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(StoreError::Sqlite(err))
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Report(_) => ErrorKind::BadRequest,
            Error::Metadata(err) => match err {
                MetadataError::EntityRequired
                | MetadataError::InvalidEntityName(_)
                | MetadataError::MetadataUnavailable { .. } => ErrorKind::BadRequest,
                MetadataError::RelationshipsIo { .. } | MetadataError::RelationshipsParse(_) => {
                    ErrorKind::Internal
                }
            },
            Error::Template(err) => match err {
                TemplateError::BlankName => ErrorKind::BadRequest,
                TemplateError::NotFound(_) => ErrorKind::NotFound,
                TemplateError::Serialization(_)
                | TemplateError::Storage(_)
                | TemplateError::InvalidPayload { .. } => ErrorKind::Internal,
            },
            Error::Settings(_) | Error::Store(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
