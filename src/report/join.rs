//! Join planning.
//!
//! Every join hangs off the base entity as an independent left join, in the
//! order the joins were declared.

use super::error::{ReportError, ReportResult};
use super::plan::{resolve_reference, PlanRegistry, Reference};
use super::request::ReportJoin;

/// An equality join between two resolved references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPlan {
    pub left: Reference,
    pub right: Reference,
}

/// Register every join target and resolve its `left=right` condition.
///
/// The left side defaults to the base entity, the right side to the join
/// target, and the right side must belong to the join target.
pub fn plan_joins(joins: &[ReportJoin], registry: &mut PlanRegistry) -> ReportResult<Vec<JoinPlan>> {
    let base_entity = registry.get(registry.base()).entity().to_string();
    let mut plans = Vec::with_capacity(joins.len());

    for (index, join) in joins.iter().enumerate() {
        let right_entity = join
            .right_entity
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(ReportError::MissingJoinEntity)?;

        let target = registry.register(right_entity, &format!("j{}", index))?;

        let on = join.on.as_deref().unwrap_or_default().trim();
        let (left_token, right_token) = on
            .split_once('=')
            .ok_or_else(|| ReportError::InvalidJoinCondition(on.to_string()))?;

        let left = resolve_reference(left_token, &base_entity, registry)?;
        let right = resolve_reference(right_token, right_entity, registry)?;
        if right.plan != target {
            return Err(ReportError::JoinTargetMismatch {
                expected: right_entity.to_string(),
                found: registry.get(right.plan).entity().to_string(),
            });
        }

        registry.get_mut(left.plan).require_key(&left.key);
        registry.get_mut(right.plan).require_key(&right.key);
        plans.push(JoinPlan { left, right });
    }

    Ok(plans)
}
