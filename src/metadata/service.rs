//! Cached entity discovery.

use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{MetadataError, MetadataResult};
use super::provider::EntityIntrospector;
use super::relationships::RelationshipCatalog;
use super::types::EntityMetadata;
use crate::cache::TtlCache;

/// How long discovered metadata is served before it is recomputed.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

static ENTITY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid entity pattern"));

/// Lists entities and describes their keys, caching both for a fixed TTL.
///
/// Entries are recomputed on the first read after expiry. Concurrent readers
/// of an expired entry may each recompute it; the last write wins.
pub struct MetadataService {
    introspector: Arc<dyn EntityIntrospector>,
    catalog: RelationshipCatalog,
    ttl: Duration,
    entity_list: TtlCache<(), Vec<String>>,
    entities: TtlCache<String, EntityMetadata>,
}

impl MetadataService {
    pub fn new(introspector: Arc<dyn EntityIntrospector>, catalog: RelationshipCatalog) -> Self {
        Self {
            introspector,
            catalog,
            ttl: DEFAULT_TTL,
            entity_list: TtlCache::new(),
            entities: TtlCache::new(),
        }
    }

    /// Override the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn catalog(&self) -> &RelationshipCatalog {
        &self.catalog
    }

    /// Sorted union of introspected EAV tables and catalog entities.
    pub fn list_entities(&self) -> Vec<String> {
        self.list_entities_at(Instant::now())
    }

    pub fn list_entities_at(&self, now: Instant) -> Vec<String> {
        if let Some(cached) = self.entity_list.get(&(), now) {
            return cached;
        }

        let mut names = match self.introspector.entity_tables() {
            Ok(tables) => tables,
            Err(e) => {
                tracing::warn!(error = %e, "entity introspection failed, listing catalog only");
                Vec::new()
            }
        };
        names.extend(self.catalog.entities().map(str::to_string));
        names.sort();
        names.dedup();

        self.entity_list.put((), names.clone(), now + self.ttl);
        names
    }

    /// Keys and relationships of one entity.
    pub fn metadata(&self, entity: &str) -> MetadataResult<EntityMetadata> {
        self.metadata_at(entity, Instant::now())
    }

    pub fn metadata_at(&self, entity: &str, now: Instant) -> MetadataResult<EntityMetadata> {
        let entity = normalize_entity(entity)?;
        if let Some(cached) = self.entities.get(&entity, now) {
            return Ok(cached);
        }

        let available_keys = self.introspector.entity_keys(&entity).map_err(|source| {
            MetadataError::MetadataUnavailable {
                entity: entity.clone(),
                source,
            }
        })?;
        let metadata = EntityMetadata {
            relationships: self.catalog.relationships(&entity).to_vec(),
            entity: entity.clone(),
            available_keys,
        };

        self.entities.put(entity, metadata.clone(), now + self.ttl);
        Ok(metadata)
    }

    /// Drop every cached entry.
    pub fn invalidate(&self) {
        self.entity_list.clear();
        self.entities.clear();
    }
}

/// Trim, validate against `[a-zA-Z0-9_]+` and lower-case an entity name.
pub fn normalize_entity(entity: &str) -> MetadataResult<String> {
    let entity = entity.trim();
    if entity.is_empty() {
        return Err(MetadataError::EntityRequired);
    }
    if !ENTITY_NAME.is_match(entity) {
        return Err(MetadataError::InvalidEntityName(entity.to_string()));
    }
    Ok(entity.to_lowercase())
}
