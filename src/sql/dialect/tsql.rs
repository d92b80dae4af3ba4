//! T-SQL dialect (SQL Server, Azure SQL).
//!
//! T-SQL features:
//! - Square bracket identifier quoting (`[identifier]`)
//! - `OFFSET n ROWS FETCH NEXT m ROWS ONLY` (2012+), which needs an `ORDER BY`

use super::helpers;
use super::SqlDialect;

/// T-SQL dialect (SQL Server, Azure SQL).
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    // Uses default emit_pagination (OFFSET ... FETCH NEXT ...)
}
