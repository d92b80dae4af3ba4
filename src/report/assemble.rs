//! Outer statement assembly.
//!
//! The base sub-query is the driving table; every join target's sub-query is
//! left-joined onto it in declared order. Output columns carry internal labels
//! (`entity_id`, `col0`, `col1`, ...); display names never reach the SQL text.

use std::collections::HashMap;

use serde::Serialize;

use super::error::{ReportError, ReportResult};
use super::join::JoinPlan;
use super::pivot::EntityQuery;
use super::plan::{PlanId, PlanRegistry, Reference, IDENTITY_KEY};
use super::projection::ColumnProjection;
use crate::sql::{table_col, Expr, ExprExt, OrderByExpr, Query, SelectExpr, TableRef};

/// One output column of a compiled report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSelection {
    pub entity_alias: String,
    pub entity_name: String,
    pub key: String,
    /// Column label in the generated SQL.
    pub label: String,
    /// Name the caller sees.
    pub display_name: String,
}

/// Label the projections: the leading identity column keeps `entity_id`,
/// the rest are numbered from `col0`.
pub fn build_selections(
    projections: &[ColumnProjection],
    registry: &PlanRegistry,
) -> Vec<ColumnSelection> {
    let mut selections = Vec::with_capacity(projections.len());
    let mut idx = 0;

    for projection in projections {
        let plan = registry.get(projection.reference.plan);
        let label = if selections.is_empty() && projection.reference.is_identity() {
            IDENTITY_KEY.to_string()
        } else {
            let label = format!("col{}", idx);
            idx += 1;
            label
        };

        selections.push(ColumnSelection {
            entity_alias: plan.alias().to_string(),
            entity_name: plan.entity().to_string(),
            key: projection.reference.key.clone(),
            label,
            display_name: projection.display.clone(),
        });
    }

    selections
}

/// Build the outer query over the per-entity sub-queries.
///
/// Rows are ordered by the base identity so consecutive pages line up.
pub fn assemble(
    queries: &HashMap<PlanId, EntityQuery>,
    registry: &PlanRegistry,
    joins: &[JoinPlan],
    selections: &[ColumnSelection],
) -> ReportResult<Query> {
    let base = registry.base();
    let base_query = entity_query(queries, registry, base)?;

    let mut select = Vec::with_capacity(selections.len());
    for selection in selections {
        let query = queries
            .values()
            .find(|q| q.alias == selection.entity_alias)
            .ok_or_else(|| unavailable(&selection.entity_name, &selection.key))?;
        let expr = column_expr(query, &selection.key)?;
        select.push(SelectExpr::new(expr).with_alias(&selection.label));
    }

    let mut outer = Query::new()
        .select(select)
        .from(TableRef::derived(base_query.query.clone()).with_alias(&base_query.alias));

    for join in joins {
        let right = entity_query(queries, registry, join.right.plan)?;
        let on = reference_expr(queries, registry, &join.left)?
            .eq(reference_expr(queries, registry, &join.right)?);
        outer = outer.left_join(
            TableRef::derived(right.query.clone()).with_alias(&right.alias),
            on,
        );
    }

    Ok(outer.order_by(vec![OrderByExpr::new(table_col(
        &base_query.alias,
        IDENTITY_KEY,
    ))]))
}

fn entity_query<'a>(
    queries: &'a HashMap<PlanId, EntityQuery>,
    registry: &PlanRegistry,
    id: PlanId,
) -> ReportResult<&'a EntityQuery> {
    queries.get(&id).ok_or_else(|| {
        let plan = registry.get(id);
        unavailable(plan.entity(), IDENTITY_KEY)
    })
}

fn reference_expr(
    queries: &HashMap<PlanId, EntityQuery>,
    registry: &PlanRegistry,
    reference: &Reference,
) -> ReportResult<Expr> {
    column_expr(entity_query(queries, registry, reference.plan)?, &reference.key)
}

fn column_expr(query: &EntityQuery, key: &str) -> ReportResult<Expr> {
    let column = query
        .column_for(key)
        .ok_or_else(|| unavailable(&query.entity, key))?;
    Ok(table_col(&query.alias, column))
}

fn unavailable(entity: &str, key: &str) -> ReportError {
    ReportError::ColumnNotAvailable {
        entity: entity.to_string(),
        key: key.to_string(),
    }
}
