//! Report execution with pagination.

use base64::Engine as _;
use rusqlite::types::Value;
use serde::Serialize;
use serde_json::{Map, Number, Value as JsonValue};

use super::compiler::BuiltReport;
use super::error::ReportError;
use crate::error::Result;
use crate::store::Database;

/// Placeholder bound to the row offset.
pub const OFFSET_PARAM: &str = "off";
/// Placeholder bound to the page size.
pub const LIMIT_PARAM: &str = "lim";

/// One page of report output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPage {
    /// Display names in declared order.
    pub columns: Vec<String>,
    /// Rows keyed by display name, in declared column order.
    pub rows: Vec<Map<String, JsonValue>>,
}

/// Runs compiled reports against a [`Database`].
#[derive(Debug, Clone)]
pub struct ReportExecutor {
    db: Database,
}

impl ReportExecutor {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Run one page of `report`. `page` is zero-based.
    pub fn run(&self, report: &BuiltReport, page: i64, size: i64) -> Result<ReportPage> {
        let offset = page_offset(page, size)?;

        let sql = report.paginated_sql(OFFSET_PARAM, LIMIT_PARAM);
        let mut params = report.parameters.clone();
        params.bind(OFFSET_PARAM, offset);
        params.bind(LIMIT_PARAM, size);

        let named = params.to_named();
        let bindings: Vec<(&str, &dyn rusqlite::ToSql)> =
            named.iter().map(|(n, v)| (n.as_str(), *v)).collect();

        let conn = self.db.connection();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(bindings.as_slice())?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut mapped = Map::with_capacity(report.columns.len());
            for column in &report.columns {
                let value: Value = row.get(column.label.as_str())?;
                mapped.insert(column.display_name.clone(), to_json(value));
            }
            out.push(mapped);
        }

        tracing::debug!(page, size, rows = out.len(), "executed report");

        Ok(ReportPage {
            columns: report.display_names(),
            rows: out,
        })
    }
}

/// Row offset of `page`, rejecting negative pages and empty sizes.
pub fn page_offset(page: i64, size: i64) -> std::result::Result<i64, ReportError> {
    if page < 0 || size <= 0 {
        return Err(ReportError::InvalidPagination { page, size });
    }
    page.checked_mul(size)
        .ok_or(ReportError::InvalidPagination { page, size })
}

fn to_json(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(n) => JsonValue::from(n),
        Value::Real(f) => Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Text(s) => JsonValue::String(s),
        Value::Blob(bytes) => {
            JsonValue::String(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
    }
}
