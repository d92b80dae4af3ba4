//! Dynamic report compiler.
//!
//! A [`ReportRequest`] names a base entity, the columns to return, filters and
//! left joins to other entities. Every entity is an EAV table, so each one is
//! pivoted into a sub-query with one column per requested attribute, and the
//! sub-queries are joined into a single parameterized statement.
//!
//! ```text
//! ┌──────────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌──────────┐
//! │ plan / join  │ → │ columns  │ → │  filters  │ → │  pivots  │ → │ assemble │
//! │  (registry)  │   │          │   │           │   │ (params) │   │          │
//! └──────────────┘   └──────────┘   └───────────┘   └──────────┘   └──────────┘
//!                                                                       │
//!                                                                       ▼
//!                                                  BuiltReport → ReportExecutor
//! ```

mod assemble;
mod compiler;
mod error;
mod executor;
mod filter;
mod join;
mod params;
mod pivot;
mod plan;
mod projection;
mod request;

pub use assemble::{assemble, build_selections, ColumnSelection};
pub use compiler::{BuiltReport, ReportCompiler};
pub use error::{ReportError, ReportResult};
pub use executor::{page_offset, ReportExecutor, ReportPage, LIMIT_PARAM, OFFSET_PARAM};
pub use filter::{collect_filters, FilterOp, FilterSpec};
pub use join::{plan_joins, JoinPlan};
pub use params::{ParamValue, ParameterCollector};
pub use pivot::{build_entity_query, EntityQuery};
pub use plan::{
    resolve_reference, EntityPlan, PlanId, PlanRegistry, Reference, BASE_ALIAS, IDENTITY_KEY,
};
pub use projection::{project_columns, ColumnProjection};
pub use request::{ReportFilter, ReportJoin, ReportRequest};
