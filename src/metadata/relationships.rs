//! Static relationship catalog.
//!
//! Relationships are declared once in a TOML document and never change while
//! the process runs:
//!
//! ```toml
//! [user_data]
//! relationships = [{ to = "loan_data", via = "user_id" }]
//!
//! [loan_data]
//! relationships = [{ to = "user_data", via = "user_id" }]
//! ```
//!
//! Entity names are trimmed and lower-cased; names outside `[a-z0-9_]+` and
//! relationships with a blank `to` or `via` are skipped.

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::error::{MetadataError, MetadataResult};
use super::types::Relationship;

static CATALOG_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid entity pattern"));

#[derive(Debug, Default, Deserialize)]
struct RawEntity {
    #[serde(default)]
    relationships: Vec<RawRelationship>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRelationship {
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    via: Option<String>,
}

/// Entity name to declared relationships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipCatalog {
    entries: BTreeMap<String, Vec<Relationship>>,
}

impl RelationshipCatalog {
    /// An empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the catalog from `path`. A missing file yields an empty catalog.
    pub fn load(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no relationship catalog, using empty");
            return Ok(Self::empty());
        }

        let content =
            std::fs::read_to_string(path).map_err(|source| MetadataError::RelationshipsIo {
                path: path.display().to_string(),
                source,
            })?;
        let catalog = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            entities = catalog.entries.len(),
            "loaded relationship catalog"
        );
        Ok(catalog)
    }

    /// Parse a catalog document.
    pub fn from_toml_str(content: &str) -> MetadataResult<Self> {
        let raw: BTreeMap<String, RawEntity> = toml::from_str(content)?;

        let mut entries = BTreeMap::new();
        for (name, entity) in raw {
            let name = name.trim().to_lowercase();
            if !CATALOG_ENTITY.is_match(&name) {
                tracing::warn!(entity = %name, "skipping relationship entry with invalid entity name");
                continue;
            }

            let relationships = entity
                .relationships
                .into_iter()
                .filter_map(|r| {
                    let to = r.to.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
                    let via = r.via.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
                    Some(Relationship::new(&to.to_lowercase(), via))
                })
                .collect();
            entries.insert(name, relationships);
        }

        Ok(Self { entries })
    }

    /// Relationships declared for `entity` (empty if none).
    pub fn relationships(&self, entity: &str) -> &[Relationship] {
        self.entries.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every entity named in the catalog, sorted.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
