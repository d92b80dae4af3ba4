//! # eavql
//!
//! A dynamic report compiler for entity-attribute-value storage.
//!
//! ## Architecture
//!
//! A report names a base entity, columns, filters and joins. Each entity lives
//! in its own EAV table, so every participating entity is pivoted into a
//! sub-query and the sub-queries are left-joined into one statement:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            ReportRequest (JSON over HTTP / CLI)          │
//! │      (baseEntity, columns, filters, joins)               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report::compiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │     PlanRegistry → per-entity pivot queries → Query      │
//! │            (named parameters, never literals)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql - token emission per dialect]
//! ┌─────────────────────────────────────────────────────────┐
//! │                 BuiltReport (SQL + params)               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report::executor]
//! ┌─────────────────────────────────────────────────────────┐
//! │              ReportPage (columns + rows)                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Alongside the compiler, [`metadata`] lists entities and their keys,
//! [`template`] stores named report definitions and [`web`] serves all of it
//! over HTTP.

pub mod cache;
pub mod config;
pub mod error;
pub mod metadata;
pub mod report;
pub mod sql;
pub mod store;
pub mod template;
pub mod web;

pub use error::{Error, ErrorKind, Result};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::report::{
        BuiltReport, ReportCompiler, ReportError, ReportExecutor, ReportFilter, ReportJoin,
        ReportPage, ReportRequest,
    };
    pub use crate::sql::{Dialect, SqlDialect};
    pub use crate::store::Database;
}

// Also export at crate root for convenience
pub use report::{BuiltReport, ReportCompiler, ReportRequest};
pub use sql::Dialect;
