//! Document model shared by stores, transforms, and the runner.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::paths::{self, FieldLookup, FieldPath};

/// One record in a collection: an opaque id plus a field mapping.
///
/// No schema is enforced; fields may be missing, extra, or of unexpected
/// type. Transforms are responsible for coping with whatever shape they find.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self { id: id.into(), fields }
    }

    /// Resolve a dotted path against this document's fields.
    pub fn lookup(&self, path: &FieldPath) -> FieldLookup<'_> {
        paths::lookup(&self.fields, path)
    }
}

/// A staged change to a single field.
///
/// `Delete` is a distinct tombstone rather than a sentinel value so stores
/// can issue their "delete field" primitive instead of writing a replacement.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Set(Value),
    Delete,
}

/// Updates staged for one document, keyed by field path.
///
/// Persisting an update set is a partial merge write: only the named paths
/// are touched, sibling fields are left alone.
pub type UpdateSet = BTreeMap<FieldPath, FieldUpdate>;
