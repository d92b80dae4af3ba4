//! ANSI SQL reference dialect.
//!
//! Follows SQL:2008 as closely as the report compiler needs:
//! - Double-quoted identifiers
//! - `OFFSET n ROWS FETCH NEXT m ROWS ONLY` pagination
//!
//! Not part of [`super::Dialect`]; used to check the trait defaults.

use super::helpers;
use super::SqlDialect;

/// ANSI SQL reference dialect.
#[derive(Debug, Clone, Copy)]
pub struct Ansi;

impl SqlDialect for Ansi {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    // Uses default emit_pagination (OFFSET ... FETCH NEXT ...)
}
