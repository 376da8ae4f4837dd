use std::borrow::Cow;

use thiserror::Error;

/// Top-level error type returned by stores and the migration runner.
///
/// Store I/O failures are fatal and abort the whole run. Per-field issues
/// (unrecognized values, malformed shapes) never surface here; they are
/// logged and isolated to the affected field during planning.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Target document disappeared between scan and write.
    #[error("document not found: '{id}'")]
    DocumentNotFound { id: String },

    /// A staged update path ran into a non-object while being applied.
    #[error("field path '{path}': expected object while traversing")]
    PathTraversal { path: String },

    /// Catch-all for store-specific failures.
    #[error("{message}")]
    Other { message: Cow<'static, str> },
}
