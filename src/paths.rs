//! Dotted field paths and helpers for reading and writing nested fields on
//! a document's JSON mapping.

use std::fmt;

use serde_json::{Map, Value};

use crate::errors::MigrateError;

/// A dotted path addressing a (possibly nested) field, e.g. `rubric.totalScore`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Build a path from its dotted form; each `.`-separated segment names
    /// one level of nesting.
    pub fn new(dotted: impl AsRef<str>) -> Self {
        Self(dotted.as_ref().split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The path one level up, or `None` for a top-level field.
    pub fn parent(&self) -> Option<FieldPath> {
        match self.0.split_last() {
            Some((_, parents)) if !parents.is_empty() => Some(FieldPath(parents.to_vec())),
            _ => None,
        }
    }

    fn split_last(&self) -> (&str, &[String]) {
        match self.0.split_last() {
            Some((last, parents)) => (last.as_str(), parents),
            None => ("", &[]),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Outcome of resolving a path against a field mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLookup<'a> {
    /// The full path resolved to a value.
    Found(&'a Value),
    /// Every parent object exists but the final field is absent.
    Absent,
    /// Some parent segment is missing or not an object; there is nothing
    /// to migrate under this path.
    ParentMissing,
}

/// Resolve `path` against `fields` without modifying anything.
pub fn lookup<'a>(fields: &'a Map<String, Value>, path: &FieldPath) -> FieldLookup<'a> {
    let (last, parents) = path.split_last();
    let mut current = fields;
    for segment in parents {
        match current.get(segment.as_str()) {
            Some(Value::Object(inner)) => current = inner,
            _ => return FieldLookup::ParentMissing,
        }
    }
    match current.get(last) {
        Some(value) => FieldLookup::Found(value),
        None => FieldLookup::Absent,
    }
}

/// Set `path` to `value`, creating intermediate objects as needed.
pub fn set_path(
    fields: &mut Map<String, Value>,
    path: &FieldPath,
    value: Value,
) -> Result<(), MigrateError> {
    let (last, parents) = path.split_last();
    let mut current = fields;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match slot {
            Value::Object(inner) => inner,
            _ => {
                return Err(MigrateError::PathTraversal {
                    path: path.to_string(),
                });
            }
        };
    }
    current.insert(last.to_string(), value);
    Ok(())
}

/// Remove the field at `path`. Removing a missing path is a no-op; the
/// return value reports whether anything was actually removed.
pub fn remove_path(fields: &mut Map<String, Value>, path: &FieldPath) -> bool {
    let (last, parents) = path.split_last();
    let mut current = fields;
    for segment in parents {
        match current.get_mut(segment.as_str()) {
            Some(Value::Object(inner)) => current = inner,
            _ => return false,
        }
    }
    current.remove(last).is_some()
}
