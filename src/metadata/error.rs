//! Metadata errors.

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised by entity discovery.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Entity parameter is required")]
    EntityRequired,

    #[error("Invalid entity name: {0}")]
    InvalidEntityName(String),

    #[error("Unable to inspect entity: {entity}")]
    MetadataUnavailable {
        entity: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to read relationship catalog {path}: {source}")]
    RelationshipsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid relationship catalog: {0}")]
    RelationshipsParse(#[from] toml::de::Error),
}

pub type MetadataResult<T> = Result<T, MetadataError>;
