//! Declarative field transforms and the per-document planner.
//!
//! A transform is a pure function from a document's current state to staged
//! field updates. Transforms are idempotent: a document that already carries
//! the target state plans to a no-op, which is what makes rerunning a
//! migration the recovery mechanism after an aborted run.

use serde_json::Value;

use crate::document::{Document, FieldUpdate, UpdateSet};
use crate::paths::{FieldLookup, FieldPath};

/// Ordered mapping table used by remap and derive transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    pairs: Vec<(Value, Value)>,
}

impl ValueTable {
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// Map a source value through the table.
    pub fn get(&self, value: &Value) -> Option<&Value> {
        self.pairs
            .iter()
            .find(|(from, _)| from == value)
            .map(|(_, to)| to)
    }

    /// Whether `value` is already one of the table's outputs.
    pub fn is_output(&self, value: &Value) -> bool {
        self.pairs.iter().any(|(_, to)| to == value)
    }
}

/// Where an added field's initial value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// A fixed default.
    Const(Value),
    /// Copy from another field, taking `default` when it is absent.
    CopyFrom { source: FieldPath, default: Value },
    /// Map another field's value through a table. With `fallback: None` an
    /// unmapped source value is unrecognized and nothing is staged; with a
    /// fallback the table's domain is total and the fallback applies to
    /// unmapped and absent source values alike.
    MapFrom {
        source: FieldPath,
        table: ValueTable,
        fallback: Option<Value>,
    },
}

/// A single declarative field transform.
///
/// Transforms only ever add, rewrite, or remove individual fields; no
/// transform deletes a document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldTransform {
    /// Add a field if it is not already present.
    EnsureField { path: FieldPath, source: ValueSource },
    /// Rewrite a field's value through a mapping table. With `to_list` the
    /// result is a list and a scalar current value is treated as a
    /// one-element list. Values already in the table's output set pass
    /// through unchanged; values in neither domain are unrecognized.
    RemapValues {
        path: FieldPath,
        table: ValueTable,
        to_list: bool,
    },
    /// Remove the field if present; absent is a no-op.
    RemoveField { path: FieldPath },
}

/// A value outside a transform's recognized domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Unrecognized {
    pub path: FieldPath,
    pub value: Value,
}

/// The staged outcome of evaluating every transform against one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPlan {
    pub updates: UpdateSet,
    /// Values that could not be mapped; excluded from the updates.
    pub unrecognized: Vec<Unrecognized>,
    /// Parent paths that were missing or not an object, deduplicated.
    pub skipped_paths: Vec<FieldPath>,
}

impl DocumentPlan {
    /// An empty plan means the document needs no update.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    fn note_missing_parent(&mut self, path: &FieldPath) {
        if let Some(parent) = path.parent()
            && !self.skipped_paths.contains(&parent)
        {
            self.skipped_paths.push(parent);
        }
    }
}

/// Evaluate `transforms` against `doc` and stage the resulting updates.
///
/// Pure: the document is not modified and no I/O happens here, which is what
/// lets a dry run compute the identical update set a live run would.
pub fn plan_document(doc: &Document, transforms: &[FieldTransform]) -> DocumentPlan {
    let mut plan = DocumentPlan::default();
    for transform in transforms {
        match transform {
            FieldTransform::EnsureField { path, source } => {
                plan_ensure(doc, path, source, &mut plan);
            }
            FieldTransform::RemapValues { path, table, to_list } => {
                plan_remap(doc, path, table, *to_list, &mut plan);
            }
            FieldTransform::RemoveField { path } => plan_remove(doc, path, &mut plan),
        }
    }
    plan
}

fn plan_ensure(doc: &Document, path: &FieldPath, source: &ValueSource, plan: &mut DocumentPlan) {
    match doc.lookup(path) {
        // already migrated
        FieldLookup::Found(_) => {}
        FieldLookup::ParentMissing => plan.note_missing_parent(path),
        FieldLookup::Absent => {
            let staged = match source {
                ValueSource::Const(value) => Some(value.clone()),
                ValueSource::CopyFrom { source, default } => match doc.lookup(source) {
                    FieldLookup::Found(value) => Some(value.clone()),
                    _ => Some(default.clone()),
                },
                ValueSource::MapFrom { source, table, fallback } => match doc.lookup(source) {
                    FieldLookup::Found(value) => match table.get(value) {
                        Some(mapped) => Some(mapped.clone()),
                        None => {
                            if fallback.is_none() {
                                plan.unrecognized.push(Unrecognized {
                                    path: path.clone(),
                                    value: value.clone(),
                                });
                            }
                            fallback.clone()
                        }
                    },
                    _ => fallback.clone(),
                },
            };
            if let Some(value) = staged {
                plan.updates.insert(path.clone(), FieldUpdate::Set(value));
            }
        }
    }
}

fn plan_remap(
    doc: &Document,
    path: &FieldPath,
    table: &ValueTable,
    to_list: bool,
    plan: &mut DocumentPlan,
) {
    let current = match doc.lookup(path) {
        FieldLookup::Found(value) => value,
        FieldLookup::Absent => return,
        FieldLookup::ParentMissing => {
            plan.note_missing_parent(path);
            return;
        }
    };

    if to_list {
        let entries: Vec<&Value> = match current {
            Value::Array(items) => items.iter().collect(),
            scalar => vec![scalar],
        };
        let mut normalized = Vec::with_capacity(entries.len());
        let mut changed = false;
        for entry in entries {
            if table.is_output(entry) {
                normalized.push(entry.clone());
            } else if let Some(mapped) = table.get(entry) {
                normalized.push(mapped.clone());
                changed = true;
            } else {
                plan.unrecognized.push(Unrecognized {
                    path: path.clone(),
                    value: entry.clone(),
                });
            }
        }
        // an all-unrecognized field stages nothing rather than an empty list
        if changed && !normalized.is_empty() {
            plan.updates
                .insert(path.clone(), FieldUpdate::Set(Value::Array(normalized)));
        }
    } else if table.is_output(current) {
        // already coerced
    } else if let Some(mapped) = table.get(current) {
        plan.updates
            .insert(path.clone(), FieldUpdate::Set(mapped.clone()));
    } else {
        plan.unrecognized.push(Unrecognized {
            path: path.clone(),
            value: current.clone(),
        });
    }
}

fn plan_remove(doc: &Document, path: &FieldPath, plan: &mut DocumentPlan) {
    match doc.lookup(path) {
        FieldLookup::Found(_) => {
            plan.updates.insert(path.clone(), FieldUpdate::Delete);
        }
        FieldLookup::Absent => {}
        FieldLookup::ParentMissing => plan.note_missing_parent(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::new("doc-1", value.as_object().cloned().unwrap())
    }

    fn yes_no() -> ValueTable {
        ValueTable::new([(json!("Yes"), json!(true)), (json!("No"), json!(false))])
    }

    #[test]
    fn ensure_is_a_noop_when_field_present() {
        let transforms = [FieldTransform::EnsureField {
            path: FieldPath::new("status"),
            source: ValueSource::Const(json!("new")),
        }];
        let plan = plan_document(&doc(json!({"status": "old"})), &transforms);
        assert!(plan.is_empty());
    }

    #[test]
    fn ensure_stages_constant_default_when_absent() {
        let transforms = [FieldTransform::EnsureField {
            path: FieldPath::new("status"),
            source: ValueSource::Const(json!("new")),
        }];
        let plan = plan_document(&doc(json!({})), &transforms);
        assert_eq!(
            plan.updates.get(&FieldPath::new("status")),
            Some(&FieldUpdate::Set(json!("new")))
        );
    }

    #[test]
    fn ensure_copies_from_legacy_field() {
        let transforms = [FieldTransform::EnsureField {
            path: FieldPath::new("rubric.contentAccuracy"),
            source: ValueSource::CopyFrom {
                source: FieldPath::new("rubric.contentAccurate"),
                default: json!(0),
            },
        }];

        let seeded = plan_document(&doc(json!({"rubric": {"contentAccurate": 3}})), &transforms);
        assert_eq!(
            seeded.updates.get(&FieldPath::new("rubric.contentAccuracy")),
            Some(&FieldUpdate::Set(json!(3)))
        );

        let defaulted = plan_document(&doc(json!({"rubric": {}})), &transforms);
        assert_eq!(
            defaulted.updates.get(&FieldPath::new("rubric.contentAccuracy")),
            Some(&FieldUpdate::Set(json!(0)))
        );
    }

    #[test]
    fn ensure_maps_from_legacy_field_with_fallback() {
        let transforms = [FieldTransform::EnsureField {
            path: FieldPath::new("level"),
            source: ValueSource::MapFrom {
                source: FieldPath::new("score"),
                table: ValueTable::new([(json!(1), json!("low")), (json!(2), json!("high"))]),
                fallback: Some(json!("")),
            },
        }];

        let mapped = plan_document(&doc(json!({"score": 2})), &transforms);
        assert_eq!(
            mapped.updates.get(&FieldPath::new("level")),
            Some(&FieldUpdate::Set(json!("high")))
        );

        // unmapped and absent sources both take the fallback, silently
        let unmapped = plan_document(&doc(json!({"score": 9})), &transforms);
        assert_eq!(
            unmapped.updates.get(&FieldPath::new("level")),
            Some(&FieldUpdate::Set(json!("")))
        );
        assert!(unmapped.unrecognized.is_empty());

        let absent = plan_document(&doc(json!({})), &transforms);
        assert_eq!(
            absent.updates.get(&FieldPath::new("level")),
            Some(&FieldUpdate::Set(json!("")))
        );
    }

    #[test]
    fn ensure_without_fallback_flags_unrecognized_source() {
        let transforms = [FieldTransform::EnsureField {
            path: FieldPath::new("level"),
            source: ValueSource::MapFrom {
                source: FieldPath::new("score"),
                table: ValueTable::new([(json!(1), json!("low"))]),
                fallback: None,
            },
        }];
        let plan = plan_document(&doc(json!({"score": 9})), &transforms);
        assert!(plan.is_empty());
        assert_eq!(plan.unrecognized.len(), 1);
        assert_eq!(plan.unrecognized[0].value, json!(9));
    }

    #[test]
    fn remap_scalar_coerces_and_passes_through_outputs() {
        let transforms = [FieldTransform::RemapValues {
            path: FieldPath::new("rubric.appropriate"),
            table: yes_no(),
            to_list: false,
        }];

        let coerced = plan_document(&doc(json!({"rubric": {"appropriate": "Yes"}})), &transforms);
        assert_eq!(
            coerced.updates.get(&FieldPath::new("rubric.appropriate")),
            Some(&FieldUpdate::Set(json!(true)))
        );

        let already = plan_document(&doc(json!({"rubric": {"appropriate": false}})), &transforms);
        assert!(already.is_empty());

        let unknown = plan_document(&doc(json!({"rubric": {"appropriate": "Maybe"}})), &transforms);
        assert!(unknown.is_empty());
        assert_eq!(unknown.unrecognized[0].value, json!("Maybe"));
    }

    #[test]
    fn remap_list_excludes_unrecognized_entries() {
        let transforms = [FieldTransform::RemapValues {
            path: FieldPath::new("cost"),
            table: ValueTable::new([(json!("Free"), json!("free"))]),
            to_list: true,
        }];

        let plan = plan_document(&doc(json!({"cost": ["Free", "Mystery", "free"]})), &transforms);
        assert_eq!(
            plan.updates.get(&FieldPath::new("cost")),
            Some(&FieldUpdate::Set(json!(["free", "free"])))
        );
        assert_eq!(plan.unrecognized.len(), 1);
        assert_eq!(plan.unrecognized[0].value, json!("Mystery"));
    }

    #[test]
    fn remap_list_with_only_unrecognized_values_stages_nothing() {
        let transforms = [FieldTransform::RemapValues {
            path: FieldPath::new("cost"),
            table: ValueTable::new([(json!("Free"), json!("free"))]),
            to_list: true,
        }];
        let plan = plan_document(&doc(json!({"cost": "Unknown Plan"})), &transforms);
        assert!(plan.is_empty());
        assert_eq!(plan.unrecognized.len(), 1);
    }

    #[test]
    fn remap_absent_field_is_a_noop() {
        let transforms = [FieldTransform::RemapValues {
            path: FieldPath::new("cost"),
            table: ValueTable::new([(json!("Free"), json!("free"))]),
            to_list: true,
        }];
        let plan = plan_document(&doc(json!({})), &transforms);
        assert!(plan.is_empty());
        assert!(plan.unrecognized.is_empty());
    }

    #[test]
    fn remove_stages_tombstone_only_when_present() {
        let transforms = [FieldTransform::RemoveField {
            path: FieldPath::new("legacy"),
        }];

        let present = plan_document(&doc(json!({"legacy": 1})), &transforms);
        assert_eq!(
            present.updates.get(&FieldPath::new("legacy")),
            Some(&FieldUpdate::Delete)
        );

        let absent = plan_document(&doc(json!({})), &transforms);
        assert!(absent.is_empty());
    }

    #[test]
    fn missing_parent_is_skipped_and_deduplicated() {
        let transforms = [
            FieldTransform::EnsureField {
                path: FieldPath::new("rubric.a"),
                source: ValueSource::Const(json!(1)),
            },
            FieldTransform::EnsureField {
                path: FieldPath::new("rubric.b"),
                source: ValueSource::Const(json!(2)),
            },
            FieldTransform::RemoveField {
                path: FieldPath::new("rubric.c"),
            },
        ];
        let plan = plan_document(&doc(json!({"title": "no rubric here"})), &transforms);
        assert!(plan.is_empty());
        assert_eq!(plan.skipped_paths, vec![FieldPath::new("rubric")]);

        // same when the parent exists with the wrong type
        let plan = plan_document(&doc(json!({"rubric": "not a map"})), &transforms);
        assert!(plan.is_empty());
        assert_eq!(plan.skipped_paths, vec![FieldPath::new("rubric")]);
    }
}
