//! Per-entity pivot sub-queries.
//!
//! Each entity plan compiles to one conditional-aggregation query over its EAV
//! table:
//!
//! ```text
//! SELECT
//!   b_src.entity_id AS entity_id,
//!   MAX(CASE WHEN b_src.column_key = :p0 THEN b_src.column_value END) AS b_c0
//! FROM user_data b_src
//! GROUP BY b_src.entity_id
//! HAVING ...
//! ```

use std::collections::HashMap;

use super::error::{ReportError, ReportResult};
use super::filter::FilterSpec;
use super::params::ParameterCollector;
use super::plan::{EntityPlan, IDENTITY_KEY};
use crate::sql::{
    case_when, col, max, param, table_col, Dialect, Expr, ExprExt, Query, SelectExpr, SqlDialect,
    TableRef,
};

const KEY_COLUMN: &str = "column_key";
const VALUE_COLUMN: &str = "column_value";

/// The compiled pivot sub-query of one entity plan.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityQuery {
    pub alias: String,
    pub entity: String,
    pub query: Query,
    pub sql: String,
    /// Attribute key to pivoted column alias.
    pub columns: HashMap<String, String>,
}

impl EntityQuery {
    /// Column exposing `key` in this sub-query's output.
    pub fn column_for(&self, key: &str) -> Option<&str> {
        if key == IDENTITY_KEY {
            return Some(IDENTITY_KEY);
        }
        self.columns.get(key).map(String::as_str)
    }
}

/// Build the pivot sub-query for `plan`, registering every literal in `params`.
pub fn build_entity_query(
    plan: &EntityPlan,
    params: &mut ParameterCollector,
    dialect: Dialect,
) -> ReportResult<EntityQuery> {
    let src = format!("{}_src", plan.alias());

    let mut select: Vec<SelectExpr> =
        vec![SelectExpr::new(table_col(&src, IDENTITY_KEY)).with_alias(IDENTITY_KEY)];
    let mut columns = HashMap::new();
    let mut aggregates: HashMap<String, Expr> = HashMap::new();

    for (idx, key) in plan.keys().iter().enumerate() {
        let alias = format!("{}_c{}", plan.alias(), idx);
        let key_param = params.add(key.as_str());
        let aggregate = max(case_when(
            table_col(&src, KEY_COLUMN).eq(param(&key_param)),
            table_col(&src, VALUE_COLUMN),
        ));

        select.push(aggregate.clone().alias(&alias));
        aggregates.insert(key.clone(), aggregate);
        columns.insert(key.clone(), alias);
    }

    let mut having: Option<Expr> = None;
    for filter in plan.filters() {
        let subject = if filter.key == IDENTITY_KEY {
            table_col(&src, IDENTITY_KEY)
        } else {
            let missing = || ReportError::ColumnNotAvailable {
                entity: plan.entity().to_string(),
                key: filter.key.clone(),
            };
            if dialect.supports_alias_in_having() {
                col(columns.get(&filter.key).ok_or_else(missing)?)
            } else {
                aggregates.get(&filter.key).cloned().ok_or_else(missing)?
            }
        };

        let predicate = filter_predicate(subject, filter, params)?;
        having = Some(match having {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
    }

    let mut query = Query::new()
        .select(select)
        .from(TableRef::new(plan.entity()).with_alias(&src))
        .group_by(vec![table_col(&src, IDENTITY_KEY)]);
    if let Some(condition) = having {
        query = query.having(condition);
    }

    Ok(EntityQuery {
        alias: plan.alias().to_string(),
        entity: plan.entity().to_string(),
        sql: query.to_sql(dialect),
        query,
        columns,
    })
}

fn filter_predicate(
    subject: Expr,
    filter: &FilterSpec,
    params: &mut ParameterCollector,
) -> ReportResult<Expr> {
    let Some(op) = filter.op.comparison() else {
        let (low, high) = filter.between_bounds()?;
        let low = param(&params.add(low));
        let high = param(&params.add(high));
        return Ok(subject.between(low, high));
    };

    Ok(Expr::BinaryOp {
        left: Box::new(subject),
        op,
        right: Box::new(param(&params.add(filter.value.clone()))),
    })
}
