//! SQLite SQL dialect.
//!
//! SQLite features:
//! - Accepts bare identifiers, double quotes for anything else
//! - `LIMIT ... OFFSET ...` pagination (no `FETCH NEXT`)
//! - Output aliases may be referenced from `HAVING`

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_minimal(ident)
    }

    fn supports_alias_in_having(&self) -> bool {
        true
    }

    fn emit_pagination(&self, offset_param: &str, limit_param: &str) -> TokenStream {
        helpers::emit_limit_offset(offset_param, limit_param)
    }
}
