//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for the handful of SQL
//! dialect differences the report compiler runs into:
//!
//! - Identifier quoting: bare-when-safe (Oracle/SQLite), `"` (PostgreSQL), `[]` (T-SQL)
//! - Table aliases: `FROM t AS x` vs `FROM t x` (Oracle rejects `AS`)
//! - Pagination: `OFFSET .. FETCH NEXT ..` vs `LIMIT .. OFFSET ..`
//! - Whether a select-list alias may be referenced from `HAVING`
//!
//! # Usage
//!
//! ```ignore
//! use eavql::sql::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Oracle;
//! let quoted = dialect.quote_identifier("loan_data");  // loan_data
//! ```
//!
//! | Feature | Oracle | SQL Server | PostgreSQL | SQLite |
//! |---------|--------|------------|------------|--------|
//! | OFFSET/FETCH | 12c+ | 2012+ | ✓ | ❌ |
//! | LIMIT/OFFSET | ❌ | ❌ | ✓ | ✓ |
//! | `AS` before table alias | ❌ | ✓ | ✓ | ✓ |
//! | Output alias in HAVING | ❌ | ❌ | ❌ | ✓ |

mod ansi;
pub mod helpers;
mod oracle;
mod postgres;
mod sqlite;
mod tsql;

// Note: Ansi is exported as a reference implementation for testing and documentation.
// It is NOT included in the Dialect enum because real databases rarely use pure ANSI SQL.
pub use ansi::Ansi;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use tsql::TSql;

use std::str::FromStr;

use super::token::TokenStream;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifiers and placeholders
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    ///
    /// - Oracle/SQLite: bare when the identifier is a plain word, `"..."` otherwise
    /// - PostgreSQL: `"identifier"`
    /// - T-SQL: `[identifier]`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Render a named bind parameter.
    ///
    /// Every supported driver accepts the `:name` form.
    fn placeholder(&self, name: &str) -> String {
        format!(":{}", name)
    }

    /// Whether `AS` may precede a table or derived-table alias.
    fn supports_table_alias_as(&self) -> bool {
        true
    }

    /// Whether `HAVING` may reference an alias declared in the select list.
    fn supports_alias_in_having(&self) -> bool {
        false
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit the pagination clause for bound offset/limit parameters.
    ///
    /// - ANSI/Oracle/T-SQL: `OFFSET :off ROWS FETCH NEXT :lim ROWS ONLY` (default)
    /// - PostgreSQL/SQLite: `LIMIT :lim OFFSET :off` (override)
    fn emit_pagination(&self, offset_param: &str, limit_param: &str) -> TokenStream {
        helpers::emit_offset_fetch(offset_param, limit_param)
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Oracle,
    TSql,
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Oracle => &Oracle,
            Dialect::TSql => &TSql,
            Dialect::Postgres => &Postgres,
            Dialect::Sqlite => &Sqlite,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn placeholder(&self, name: &str) -> String {
        self.dialect().placeholder(name)
    }

    fn supports_table_alias_as(&self) -> bool {
        self.dialect().supports_table_alias_as()
    }

    fn supports_alias_in_having(&self) -> bool {
        self.dialect().supports_alias_in_having()
    }

    fn emit_pagination(&self, offset_param: &str, limit_param: &str) -> TokenStream {
        self.dialect().emit_pagination(offset_param, limit_param)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

/// Error returned when a dialect name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported SQL dialect: {0}")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "oracle" => Ok(Dialect::Oracle),
            "tsql" | "mssql" | "sqlserver" => Ok(Dialect::TSql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(UnknownDialect(other.to_string())),
        }
    }
}
