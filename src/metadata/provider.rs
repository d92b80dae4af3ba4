//! EntityIntrospector trait definition.
//!
//! The EntityIntrospector trait abstracts over how EAV tables are discovered.
//! The primary implementation is the SQLite [`Database`].

use crate::store::{Database, StoreResult};

/// Discovers EAV tables and their attribute keys.
///
/// # Example
///
/// ```ignore
/// use eavql::metadata::EntityIntrospector;
///
/// fn example(introspector: &impl EntityIntrospector) -> StoreResult<()> {
///     let tables = introspector.entity_tables()?;
///     let keys = introspector.entity_keys("loan_data")?;
///     Ok(())
/// }
/// ```
pub trait EntityIntrospector: Send + Sync {
    /// Lower-cased names of every table with the EAV shape.
    fn entity_tables(&self) -> StoreResult<Vec<String>>;

    /// Sorted distinct attribute keys stored for `entity`.
    fn entity_keys(&self, entity: &str) -> StoreResult<Vec<String>>;
}

impl EntityIntrospector for Database {
    fn entity_tables(&self) -> StoreResult<Vec<String>> {
        Database::entity_tables(self)
    }

    fn entity_keys(&self, entity: &str) -> StoreResult<Vec<String>> {
        Database::entity_keys(self, entity)
    }
}
