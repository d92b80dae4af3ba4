//! Saved report definitions.
//!
//! A template stores one [`ReportRequest`] under a name, together with the
//! user who saved it. The `config_json` column holds
//!
//! ```json
//! { "request": { "baseEntity": "user_data", ... }, "createdBy": "alice" }
//! ```
//!
//! Older rows hold the bare request object; those read back with the
//! `"system"` author.

mod error;

pub use error::{TemplateError, TemplateResult};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::report::ReportRequest;
use crate::store::Database;

/// Author recorded when the caller does not identify itself.
pub const SYSTEM_USER: &str = "system";

/// A template as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTemplate {
    pub id: i64,
    pub name: String,
    pub request: ReportRequest,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplatePayload {
    request: ReportRequest,
    #[serde(default)]
    created_by: Option<String>,
}

/// Raw row before the payload is decoded.
struct TemplateRow {
    id: i64,
    name: String,
    config_json: String,
    created_at: String,
}

impl TemplateRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            config_json: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

const SELECT_TEMPLATE: &str = "SELECT id, name, config_json, created_at FROM report_templates";

/// Stores and reads report templates.
#[derive(Debug, Clone)]
pub struct TemplateService {
    db: Database,
}

impl TemplateService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Save `request` under `name`.
    ///
    /// The name is trimmed and must not be blank. A missing or blank
    /// `created_by` is recorded as [`SYSTEM_USER`].
    pub fn save(
        &self,
        name: &str,
        request: &ReportRequest,
        created_by: Option<&str>,
    ) -> TemplateResult<StoredTemplate> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TemplateError::BlankName);
        }
        let author = author_or_system(created_by);

        let payload = serde_json::to_string(&TemplatePayload {
            request: request.clone(),
            created_by: Some(author.clone()),
        })?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let id = {
            let conn = self.db.connection();
            conn.execute(
                "INSERT INTO report_templates (name, config_json, created_at) VALUES (?1, ?2, ?3)",
                params![name, payload, created_at],
            )?;
            conn.last_insert_rowid()
        };

        tracing::info!(id, name, created_by = %author, "saved report template");
        self.get(id)
    }

    /// Every template, newest first.
    pub fn list(&self) -> TemplateResult<Vec<StoredTemplate>> {
        let rows = {
            let conn = self.db.connection();
            let mut stmt =
                conn.prepare(&format!("{} ORDER BY created_at DESC, id DESC", SELECT_TEMPLATE))?;
            let rows = stmt
                .query_map([], TemplateRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        rows.into_iter().map(decode).collect()
    }

    pub fn get(&self, id: i64) -> TemplateResult<StoredTemplate> {
        let row = self
            .db
            .connection()
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_TEMPLATE),
                params![id],
                TemplateRow::from_row,
            )
            .optional()?
            .ok_or(TemplateError::NotFound(id))?;

        decode(row)
    }
}

fn author_or_system(created_by: Option<&str>) -> String {
    created_by
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(SYSTEM_USER)
        .to_string()
}

fn decode(row: TemplateRow) -> TemplateResult<StoredTemplate> {
    let id = row.id;
    let invalid = move |reason: String| TemplateError::InvalidPayload { id, reason };

    let (request, created_by) =
        decode_payload(&row.config_json).map_err(|e| invalid(e.to_string()))?;
    let created_at = DateTime::parse_from_rfc3339(&row.created_at)
        .map_err(|e| invalid(format!("bad timestamp '{}': {}", row.created_at, e)))?
        .with_timezone(&Utc);

    Ok(StoredTemplate {
        id,
        name: row.name,
        request,
        created_by,
        created_at,
    })
}

/// Decode either the `{request, createdBy}` payload or a legacy bare request.
fn decode_payload(json: &str) -> serde_json::Result<(ReportRequest, String)> {
    let value: Value = serde_json::from_str(json)?;

    let wrapped = value.get("request").is_some_and(|r| !r.is_null());
    if wrapped {
        if let Ok(payload) = serde_json::from_value::<TemplatePayload>(value.clone()) {
            return Ok((
                payload.request,
                author_or_system(payload.created_by.as_deref()),
            ));
        }
    }

    let request = serde_json::from_value(value)?;
    Ok((request, SYSTEM_USER.to_string()))
}
