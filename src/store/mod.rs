//! SQLite storage for EAV entity tables and report templates.
//!
//! One [`Database`] wraps a single connection behind a mutex and is cheap to
//! clone. Entity tables have the shape
//!
//! ```text
//! <entity>(id INTEGER PRIMARY KEY, entity_id INTEGER, column_key TEXT, column_value TEXT)
//! ```
//!
//! and any table exposing `entity_id`, `column_key` and `column_value` is
//! treated as an entity by [`Database::entity_tables`].

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use rusqlite::{params, Connection};
use serde_json::Value;

use crate::sql::dialect::helpers::is_plain_identifier;
use crate::sql::{Dialect, SqlDialect};

/// Path value that selects an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid seed data for '{entity}': {reason}")]
    InvalidSeed { entity: String, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open or create the database at `path`. `":memory:"` opens an
    /// in-memory database.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if path.as_os_str() == IN_MEMORY {
            return Self::open_in_memory();
        }

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let db = Self::from_connection(Connection::open(path)?);
        db.init()?;
        tracing::info!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Self::from_connection(Connection::open_in_memory()?);
        db.init()?;
        Ok(db)
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Initialize the template table.
    fn init(&self) -> StoreResult<()> {
        self.connection().execute_batch(
            "
            CREATE TABLE IF NOT EXISTS report_templates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                config_json TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Lock the connection for direct use.
    ///
    /// Callers must not hold the guard across another `Database` call.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    // =========================================================================
    // Entity tables
    // =========================================================================

    /// Create an EAV table for `entity` if it does not exist.
    pub fn create_entity_table(&self, entity: &str) -> StoreResult<()> {
        let table = table_ident(entity)?;
        let index = table_ident(&format!("{}_entity_key", entity))?;
        self.connection().execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entity_id INTEGER NOT NULL,
                column_key TEXT NOT NULL,
                column_value TEXT
            );
            CREATE INDEX IF NOT EXISTS {index} ON {table} (entity_id, column_key);
            "
        ))?;
        Ok(())
    }

    /// Insert one attribute row.
    pub fn insert_attribute(
        &self,
        entity: &str,
        entity_id: i64,
        key: &str,
        value: Option<&str>,
    ) -> StoreResult<()> {
        let table = table_ident(entity)?;
        self.connection().execute(
            &format!(
                "INSERT INTO {} (entity_id, column_key, column_value) VALUES (?1, ?2, ?3)",
                table
            ),
            params![entity_id, key, value],
        )?;
        Ok(())
    }

    /// Insert every attribute of one entity row in a single transaction.
    pub fn insert_entity(
        &self,
        entity: &str,
        entity_id: i64,
        attributes: &[(&str, &str)],
    ) -> StoreResult<()> {
        let table = table_ident(entity)?;
        let mut conn = self.connection();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (entity_id, column_key, column_value) VALUES (?1, ?2, ?3)",
                table
            ))?;
            for (key, value) in attributes {
                stmt.execute(params![entity_id, key, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Create `entity` and load an array of `{entity_id, key: value, ...}` rows.
    ///
    /// Non-string scalars are stored as their JSON text; nulls are skipped.
    pub fn seed_entity(&self, entity: &str, rows: &Value) -> StoreResult<usize> {
        let invalid = |reason: &str| StoreError::InvalidSeed {
            entity: entity.to_string(),
            reason: reason.to_string(),
        };

        let rows = rows
            .as_array()
            .ok_or_else(|| invalid("expected an array of rows"))?;
        self.create_entity_table(entity)?;

        for row in rows {
            let row = row
                .as_object()
                .ok_or_else(|| invalid("expected each row to be an object"))?;
            let entity_id = row
                .get("entity_id")
                .and_then(Value::as_i64)
                .ok_or_else(|| invalid("row is missing an integer entity_id"))?;

            let attributes: Vec<(&str, String)> = row
                .iter()
                .filter(|(key, _)| key.as_str() != "entity_id")
                .filter_map(|(key, value)| match value {
                    Value::Null => None,
                    Value::String(s) => Some((key.as_str(), s.clone())),
                    other => Some((key.as_str(), other.to_string())),
                })
                .collect();
            let attributes: Vec<(&str, &str)> =
                attributes.iter().map(|(k, v)| (*k, v.as_str())).collect();

            self.insert_entity(entity, entity_id, &attributes)?;
        }
        Ok(rows.len())
    }

    /// Names of every table with the EAV shape, lower-cased and sorted.
    pub fn entity_tables(&self) -> StoreResult<Vec<String>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT m.name FROM sqlite_master m
             WHERE m.type = 'table'
               AND (SELECT COUNT(*) FROM pragma_table_info(m.name) p
                    WHERE lower(p.name) IN ('entity_id', 'column_key', 'column_value')) = 3
             ORDER BY m.name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|name| name.map(|n| n.to_lowercase()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Distinct attribute keys stored for `entity`, sorted.
    pub fn entity_keys(&self, entity: &str) -> StoreResult<Vec<String>> {
        let table = table_ident(entity)?;
        let conn = self.connection();
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT column_key FROM {} ORDER BY column_key",
            table
        ))?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

/// Quote a table name after checking it is a plain identifier.
fn table_ident(name: &str) -> StoreResult<String> {
    if !is_plain_identifier(name) {
        return Err(StoreError::InvalidTableName(name.to_string()));
    }
    Ok(Dialect::Sqlite.quote_identifier(name))
}
