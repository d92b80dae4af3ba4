//! Filter collection.
//!
//! Filters attach to the plan of the entity they reference and later become
//! `HAVING` predicates of that entity's pivot sub-query.

use std::fmt;
use std::str::FromStr;

use super::error::{ReportError, ReportResult};
use super::plan::{resolve_reference, PlanRegistry};
use super::request::ReportFilter;
use crate::sql::BinaryOperator;

/// The closed set of filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lt,
    Gt,
    Lte,
    Gte,
    Like,
    Between,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Lt => "<",
            FilterOp::Gt => ">",
            FilterOp::Lte => "<=",
            FilterOp::Gte => ">=",
            FilterOp::Like => "like",
            FilterOp::Between => "between",
        }
    }

    /// The binary comparison this operator renders as. `between` has none.
    pub fn comparison(&self) -> Option<BinaryOperator> {
        match self {
            FilterOp::Eq => Some(BinaryOperator::Eq),
            FilterOp::Lt => Some(BinaryOperator::Lt),
            FilterOp::Gt => Some(BinaryOperator::Gt),
            FilterOp::Lte => Some(BinaryOperator::Lte),
            FilterOp::Gte => Some(BinaryOperator::Gte),
            FilterOp::Like => Some(BinaryOperator::Like),
            FilterOp::Between => None,
        }
    }
}

impl FromStr for FilterOp {
    type Err = ReportError;

    /// Operators are matched after trimming and lower-casing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "=" => Ok(FilterOp::Eq),
            "<" => Ok(FilterOp::Lt),
            ">" => Ok(FilterOp::Gt),
            "<=" => Ok(FilterOp::Lte),
            ">=" => Ok(FilterOp::Gte),
            "like" => Ok(FilterOp::Like),
            "between" => Ok(FilterOp::Between),
            _ => Err(ReportError::OperatorNotAllowed(s.to_string())),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated filter bound to one entity plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub key: String,
    pub op: FilterOp,
    pub value: Option<String>,
}

impl FilterSpec {
    /// Split a `between` payload on its first comma into two trimmed bounds.
    pub fn between_bounds(&self) -> ReportResult<(String, String)> {
        let value = self
            .value
            .as_deref()
            .ok_or(ReportError::InvalidBetweenValue)?;
        let (low, high) = value
            .split_once(',')
            .ok_or(ReportError::InvalidBetweenValue)?;
        Ok((low.trim().to_string(), high.trim().to_string()))
    }
}

/// Resolve every filter and attach it to its owning plan.
pub fn collect_filters(filters: &[ReportFilter], registry: &mut PlanRegistry) -> ReportResult<()> {
    let base_entity = registry.get(registry.base()).entity().to_string();

    for filter in filters {
        let reference = resolve_reference(&filter.key, &base_entity, registry)?;
        let op: FilterOp = filter.op.parse()?;

        let plan = registry.get_mut(reference.plan);
        plan.require_key(&reference.key);
        plan.add_filter(FilterSpec {
            key: reference.key,
            op,
            value: filter.value.clone(),
        });
    }

    Ok(())
}
