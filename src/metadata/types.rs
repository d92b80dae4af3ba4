//! Metadata types returned by discovery endpoints.

use serde::{Deserialize, Serialize};

/// Known attribute keys and configured relationships of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    pub entity: String,
    pub available_keys: Vec<String>,
    pub relationships: Vec<Relationship>,
}

/// A statically declared link from one entity to another through a shared key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub to: String,
    pub via: String,
}

impl Relationship {
    pub fn new(to: &str, via: &str) -> Self {
        Self {
            to: to.into(),
            via: via.into(),
        }
    }
}
