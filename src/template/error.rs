//! Template persistence errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template name is required")]
    BlankName,

    #[error("Template not found: {0}")]
    NotFound(i64),

    #[error("Unable to serialize template: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template storage failed: {0}")]
    Storage(#[from] StoreError),

    #[error("Stored template {id} is unreadable: {reason}")]
    InvalidPayload { id: i64, reason: String },
}

impl From<rusqlite::Error> for TemplateError {
    fn from(err: rusqlite::Error) -> Self {
        TemplateError::Storage(StoreError::Sqlite(err))
    }
}

pub type TemplateResult<T> = Result<T, TemplateError>;
