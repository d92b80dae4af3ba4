//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use once_cell::sync::Lazy;
use regex::Regex;

use super::super::token::{Token, TokenStream};

// =============================================================================
// Identifier Quoting
// =============================================================================

static PLAIN_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

/// Whether an identifier can be emitted without quotes.
pub fn is_plain_identifier(ident: &str) -> bool {
    PLAIN_IDENT.is_match(ident)
}

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, and as the fallback of `quote_minimal`
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL (SQL Server, Azure SQL)
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

/// Leave plain identifiers bare, double-quote anything else.
///
/// Quoted identifiers are case-sensitive in Oracle, so the bare form keeps
/// `user_data` resolving to the upper-cased dictionary name.
/// Used by: Oracle, SQLite
pub fn quote_minimal(ident: &str) -> String {
    if is_plain_identifier(ident) {
        ident.to_string()
    } else {
        quote_double(ident)
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Emit `LIMIT :lim OFFSET :off`.
/// Used by: Postgres, SQLite
pub fn emit_limit_offset(offset_param: &str, limit_param: &str) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::Limit)
        .space()
        .push(Token::Param(limit_param.into()))
        .space()
        .push(Token::Offset)
        .space()
        .push(Token::Param(offset_param.into()));
    ts
}

/// Emit `OFFSET :off ROWS FETCH NEXT :lim ROWS ONLY`.
/// Used by: ANSI, Oracle 12c+, T-SQL 2012+
pub fn emit_offset_fetch(offset_param: &str, limit_param: &str) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::Offset)
        .space()
        .push(Token::Param(offset_param.into()))
        .space()
        .push(Token::Rows)
        .space()
        .push(Token::Fetch)
        .space()
        .push(Token::Next)
        .space()
        .push(Token::Param(limit_param.into()))
        .space()
        .push(Token::Rows)
        .space()
        .push(Token::Only);
    ts
}
