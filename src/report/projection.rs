//! Column projection: which `(entity, key)` pairs the report returns and
//! under which display names.

use std::collections::HashSet;

use super::error::ReportResult;
use super::plan::{resolve_reference, PlanRegistry, Reference, IDENTITY_KEY};

/// One requested output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProjection {
    pub reference: Reference,
    pub display: String,
}

/// Resolve the requested columns, identity first.
///
/// Blank tokens are skipped and repeated `(entity, key)` pairs keep their
/// first occurrence. Dotted tokens are displayed verbatim; bare keys display
/// as `key` on the base entity.
pub fn project_columns(
    columns: &[String],
    registry: &mut PlanRegistry,
) -> ReportResult<Vec<ColumnProjection>> {
    let base = registry.base();
    let base_entity = registry.get(base).entity().to_string();

    let identity = Reference {
        plan: base,
        key: IDENTITY_KEY.to_string(),
    };
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(dedupe_key(registry, &identity));

    let mut projections = vec![ColumnProjection {
        reference: identity,
        display: IDENTITY_KEY.to_string(),
    }];

    for raw in columns {
        let token = raw.trim();
        if token.is_empty() {
            continue;
        }

        let reference = resolve_reference(token, &base_entity, registry)?;
        registry.get_mut(reference.plan).require_key(&reference.key);

        let display = if token.contains('.') {
            token.to_string()
        } else if reference.plan == base {
            reference.key.clone()
        } else {
            format!("{}.{}", registry.get(reference.plan).entity(), reference.key)
        };

        if seen.insert(dedupe_key(registry, &reference)) {
            projections.push(ColumnProjection { reference, display });
        }
    }

    Ok(projections)
}

fn dedupe_key(registry: &PlanRegistry, reference: &Reference) -> String {
    format!("{}:{}", registry.get(reference.plan).alias(), reference.key)
}
