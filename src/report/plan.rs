//! Entity plans and reference resolution.
//!
//! Every entity that takes part in a report gets one [`EntityPlan`], held in
//! an insertion-ordered [`PlanRegistry`] owned by a single compile call. The
//! base entity is always registered first under alias `b`; join targets follow
//! as `j0`, `j1`, ... in declaration order.

use std::collections::HashMap;

use super::error::{ReportError, ReportResult};
use super::filter::FilterSpec;

/// Reserved key naming the row identity of every EAV table.
pub const IDENTITY_KEY: &str = "entity_id";

/// Alias of the base entity's sub-query.
pub const BASE_ALIAS: &str = "b";

/// Handle to a plan inside a [`PlanRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanId(usize);

/// One participating entity and what its pivot sub-query must expose.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPlan {
    entity: String,
    alias: String,
    keys: Vec<String>,
    filters: Vec<FilterSpec>,
}

impl EntityPlan {
    pub fn new(entity: &str, alias: &str) -> Self {
        Self {
            entity: entity.into(),
            alias: alias.into(),
            keys: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Required attribute keys in first-seen order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    /// Mark `key` as required. The identity key is always available and is
    /// never pivoted.
    pub fn require_key(&mut self, key: &str) {
        if key.trim().is_empty() || key == IDENTITY_KEY {
            return;
        }
        if !self.keys.iter().any(|k| k == key) {
            self.keys.push(key.to_string());
        }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn add_filter(&mut self, filter: FilterSpec) {
        self.filters.push(filter);
    }
}

/// Insertion-ordered map of entity name to plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRegistry {
    plans: Vec<EntityPlan>,
    by_entity: HashMap<String, PlanId>,
}

impl PlanRegistry {
    /// Create a registry holding only the base entity.
    pub fn with_base(entity: &str) -> Self {
        let mut registry = Self {
            plans: Vec::new(),
            by_entity: HashMap::new(),
        };
        registry.insert(EntityPlan::new(entity, BASE_ALIAS));
        registry
    }

    fn insert(&mut self, plan: EntityPlan) -> PlanId {
        let id = PlanId(self.plans.len());
        self.by_entity.insert(plan.entity.clone(), id);
        self.plans.push(plan);
        id
    }

    /// Register a join target. Each entity may appear once per report.
    pub fn register(&mut self, entity: &str, alias: &str) -> ReportResult<PlanId> {
        if self.by_entity.contains_key(entity) {
            return Err(ReportError::DuplicateJoinEntity(entity.to_string()));
        }
        Ok(self.insert(EntityPlan::new(entity, alias)))
    }

    pub fn base(&self) -> PlanId {
        PlanId(0)
    }

    pub fn lookup(&self, entity: &str) -> Option<PlanId> {
        self.by_entity.get(entity).copied()
    }

    pub fn get(&self, id: PlanId) -> &EntityPlan {
        &self.plans[id.0]
    }

    pub fn get_mut(&mut self, id: PlanId) -> &mut EntityPlan {
        &mut self.plans[id.0]
    }

    /// Plans in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (PlanId, &EntityPlan)> {
        self.plans.iter().enumerate().map(|(i, p)| (PlanId(i), p))
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

/// A resolved `(plan, key)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub plan: PlanId,
    pub key: String,
}

impl Reference {
    pub fn is_identity(&self) -> bool {
        self.key == IDENTITY_KEY
    }
}

/// Resolve `entity.key` or a bare `key` (against `default_entity`).
///
/// Only the first `.` separates entity from key.
pub fn resolve_reference(
    token: &str,
    default_entity: &str,
    registry: &PlanRegistry,
) -> ReportResult<Reference> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ReportError::EmptyReference);
    }

    let (entity, key) = match token.split_once('.') {
        Some((entity, key)) => (entity.trim(), key.trim()),
        None => (default_entity, token),
    };
    if key.is_empty() {
        return Err(ReportError::EmptyReference);
    }

    let plan = registry
        .lookup(entity)
        .ok_or_else(|| ReportError::UnknownEntity(entity.to_string()))?;

    Ok(Reference {
        plan,
        key: key.to_string(),
    })
}
