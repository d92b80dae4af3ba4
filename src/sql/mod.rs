//! SQL generation module.
//!
//! This module provides a type-safe SQL builder that generates multi-dialect SQL.
//! It includes:
//!
//! - [`query`] - SELECT query builder (derived tables, left joins, grouping)
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;


// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect, UnknownDialect};
pub use expr::{
    case_when, col, func, max, param, table_col, BinaryOperator, Expr, ExprExt,
};
pub use query::{
    Join, OrderByExpr, Pagination, Query, SelectExpr, TableRef, TableSource,
};
pub use token::{Token, TokenStream};
