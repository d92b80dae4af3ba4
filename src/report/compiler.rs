//! End-to-end compilation from a report request to parameterized SQL.
//!
//! ```text
//! ReportRequest → plans → joins → columns → filters → pivots → outer query
//! ```
//!
//! # Example
//!
//! ```ignore
//! use eavql::report::{ReportCompiler, ReportRequest};
//! use eavql::sql::Dialect;
//!
//! let request = ReportRequest::new("user_data")
//!     .with_join("loan_data", "user_id=user_id")
//!     .with_columns(&["first_name", "loan_data.loan_amount"])
//!     .with_filter("loan_data.status", "=", Some("approved"));
//!
//! let report = ReportCompiler::new(Dialect::Oracle).compile(&request)?;
//! println!("{}", report.sql);
//! ```

use std::collections::HashMap;

use serde::Serialize;

use super::assemble::{assemble, build_selections, ColumnSelection};
use super::error::{ReportError, ReportResult};
use super::filter::collect_filters;
use super::join::plan_joins;
use super::params::ParameterCollector;
use super::pivot::build_entity_query;
use super::plan::PlanRegistry;
use super::projection::project_columns;
use super::request::ReportRequest;
use crate::sql::{Dialect, Query};

/// The compiled artifact of one report request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltReport {
    /// The assembled statement, without pagination.
    pub sql: String,

    /// Every bound value, in placeholder order.
    pub parameters: ParameterCollector,

    /// Output columns in declared order.
    pub columns: Vec<ColumnSelection>,

    #[serde(skip)]
    pub query: Query,

    #[serde(skip)]
    pub dialect: Dialect,
}

impl BuiltReport {
    /// Names the caller sees, in column order.
    pub fn display_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.display_name.clone()).collect()
    }

    /// The statement with a bound pagination clause appended.
    pub fn paginated_sql(&self, offset_param: &str, limit_param: &str) -> String {
        self.query
            .clone()
            .paginate(offset_param, limit_param)
            .to_sql(self.dialect)
    }
}

/// Compiles report requests for one SQL dialect.
///
/// Holds no state between calls; every `compile` owns its own plan registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportCompiler {
    dialect: Dialect,
}

impl ReportCompiler {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Compile `request` into one statement plus its parameters.
    pub fn compile(&self, request: &ReportRequest) -> ReportResult<BuiltReport> {
        let base_entity = request
            .base_entity
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(ReportError::MissingBaseEntity)?;

        let mut registry = PlanRegistry::with_base(base_entity);
        let joins = plan_joins(&request.joins, &mut registry)?;
        let projections = project_columns(&request.columns, &mut registry)?;
        collect_filters(&request.filters, &mut registry)?;

        let mut parameters = ParameterCollector::new();
        let mut queries = HashMap::with_capacity(registry.len());
        for (id, plan) in registry.iter() {
            queries.insert(id, build_entity_query(plan, &mut parameters, self.dialect)?);
        }

        let columns = build_selections(&projections, &registry);
        let query = assemble(&queries, &registry, &joins, &columns)?;
        let sql = query.to_sql(self.dialect);

        tracing::debug!(
            base = base_entity,
            entities = registry.len(),
            columns = columns.len(),
            parameters = parameters.len(),
            dialect = %self.dialect,
            "compiled report"
        );

        Ok(BuiltReport {
            sql,
            parameters,
            columns,
            query,
            dialect: self.dialect,
        })
    }
}
