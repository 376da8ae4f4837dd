//! fieldshift: an idempotent, dry-run-capable field migration runner for
//! document collections.
//!
//! A migration is a named list of declarative [`transform::FieldTransform`]s
//! over one collection. The [`runner::MigrationRunner`] streams every
//! document, plans the staged updates for each, and conditionally persists
//! them as partial merge writes through a [`store::DocumentStore`]. Reruns
//! are always safe: transforms detect already-migrated documents and plan a
//! no-op, so idempotence replaces checkpointing.

pub mod catalog;
pub mod document;
pub mod errors;
pub mod paths;
pub mod runner;
pub mod store;
pub mod transform;

pub use catalog::{Migration, find_migration, registered_migrations};
pub use document::{Document, FieldUpdate, UpdateSet};
pub use errors::MigrateError;
pub use paths::{FieldLookup, FieldPath};
pub use runner::{MigrationRunner, RunStats};
pub use store::{DocumentStore, MemoryStore, RedisStore};
pub use transform::{
    DocumentPlan, FieldTransform, Unrecognized, ValueSource, ValueTable, plan_document,
};
