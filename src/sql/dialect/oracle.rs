//! Oracle SQL dialect.
//!
//! Oracle features relevant to report queries:
//! - Unquoted identifiers fold to upper case, so plain names stay bare
//! - No `AS` between a table (or inline view) and its alias
//! - `OFFSET n ROWS FETCH NEXT m ROWS ONLY` (12c+)
//! - Select-list aliases are not visible in `HAVING`

use super::helpers;
use super::SqlDialect;

/// Oracle SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Oracle;

impl SqlDialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_minimal(ident)
    }

    fn supports_table_alias_as(&self) -> bool {
        false
    }

    // Uses default emit_pagination (OFFSET ... FETCH NEXT ...)
}
