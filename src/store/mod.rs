//! Document store abstraction plus the Redis and in-memory backends.

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use crate::document::{Document, UpdateSet};
use crate::errors::MigrateError;

/// The capabilities the runner needs from a store: stream a collection,
/// apply a partial update, and delete individual fields (staged as
/// `FieldUpdate::Delete` entries in the update set). No query or filter
/// capability is required; all filtering happens in-process.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Fetch every document in `collection`. Iteration order is not
    /// guaranteed and must not be relied on.
    async fn scan_documents(&mut self, collection: &str) -> Result<Vec<Document>, MigrateError>;

    /// Apply a partial merge write to one document: only the named field
    /// paths are touched, everything else is left as-is.
    async fn apply_updates(
        &mut self,
        collection: &str,
        id: &str,
        updates: &UpdateSet,
    ) -> Result<(), MigrateError>;
}
