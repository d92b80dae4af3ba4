//! Entity metadata module.
//!
//! Discovery of what a report can reference: which entities exist and which
//! attribute keys and relationships each one has.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MetadataService                            │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │  TtlCache (5 min)          │  RelationshipCatalog (TOML)  │  │
//! │  │  - list_entities()         │  - relationships(entity)     │  │
//! │  │  - metadata(entity)        │  - entities()                │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    EntityIntrospector                           │
//! │              (SQLite schema + DISTINCT column_key)              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use eavql::metadata::{MetadataService, RelationshipCatalog};
//! use eavql::store::Database;
//!
//! let db = Database::open("eavql.db")?;
//! let catalog = RelationshipCatalog::load("relationships.toml")?;
//! let service = MetadataService::new(Arc::new(db), catalog);
//!
//! let entities = service.list_entities();
//! let loans = service.metadata("loan_data")?;
//! ```

mod error;
mod provider;
mod relationships;
mod service;
mod types;

pub use error::{MetadataError, MetadataResult};
pub use provider::EntityIntrospector;
pub use relationships::RelationshipCatalog;
pub use service::{normalize_entity, MetadataService, DEFAULT_TTL};
pub use types::{EntityMetadata, Relationship};
