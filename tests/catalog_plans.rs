//! Planner-level coverage of the registered migrations: every declared value
//! mapping, already-migrated no-ops, and malformed-shape skips.

use serde_json::{Value, json};

use fieldshift::{Document, FieldPath, FieldUpdate, find_migration, plan_document};

fn doc(id: &str, value: Value) -> Document {
    Document::new(id, value.as_object().cloned().unwrap())
}

#[test]
fn cultural_responsiveness_covers_every_declared_level() {
    let migration = find_migration("add-cultural-responsiveness").unwrap();
    let target = FieldPath::new("culturalResponsiveness");

    let expected = [
        (json!(0), json!("none")),
        (json!(1), json!("low")),
        (json!(2), json!("some")),
        (json!(3), json!("good")),
        (json!(4), json!("high")),
        (json!(5), json!("high")),
        (json!(-1), json!("")),
    ];
    for (score, level) in expected {
        let plan = plan_document(
            &doc("r", json!({"culturalResponsivness": score})),
            &migration.transforms,
        );
        assert_eq!(plan.updates.get(&target), Some(&FieldUpdate::Set(level)));
    }

    // out-of-range scores and missing legacy field both take the fallback
    for fields in [json!({"culturalResponsivness": 7}), json!({})] {
        let plan = plan_document(&doc("r", fields), &migration.transforms);
        assert_eq!(plan.updates.get(&target), Some(&FieldUpdate::Set(json!(""))));
    }

    // already migrated
    let plan = plan_document(
        &doc("r", json!({"culturalResponsiveness": "good", "culturalResponsivness": 3})),
        &migration.transforms,
    );
    assert!(plan.is_empty());
}

#[test]
fn rubric_backfill_adds_missing_fields_and_seeds_renamed_scores() {
    let migration = find_migration("backfill-rubric-defaults").unwrap();

    let plan = plan_document(
        &doc("r", json!({"rubric": {"appropriate": true, "contentAccurate": 3}})),
        &migration.transforms,
    );

    // 20 targets, one already present
    assert_eq!(plan.updates.len(), 19);
    assert!(!plan.updates.contains_key(&FieldPath::new("rubric.appropriate")));
    assert_eq!(
        plan.updates.get(&FieldPath::new("rubric.contentAccuracy")),
        Some(&FieldUpdate::Set(json!(3)))
    );
    assert_eq!(
        plan.updates.get(&FieldPath::new("rubric.contentCurrentness")),
        Some(&FieldUpdate::Set(json!(0)))
    );
    assert_eq!(
        plan.updates.get(&FieldPath::new("rubric.genderBalance")),
        Some(&FieldUpdate::Set(json!([])))
    );
    assert_eq!(
        plan.updates.get(&FieldPath::new("rubric.additionalComments")),
        Some(&FieldUpdate::Set(Value::Null))
    );
}

#[test]
fn rubric_backfill_skips_documents_without_a_rubric() {
    let migration = find_migration("backfill-rubric-defaults").unwrap();

    let missing = plan_document(&doc("r", json!({"title": "x"})), &migration.transforms);
    assert!(missing.is_empty());
    assert_eq!(missing.skipped_paths, vec![FieldPath::new("rubric")]);

    let wrong_type = plan_document(&doc("r", json!({"rubric": 7})), &migration.transforms);
    assert!(wrong_type.is_empty());
    assert_eq!(wrong_type.skipped_paths, vec![FieldPath::new("rubric")]);
}

#[test]
fn cost_table_covers_every_declared_label() {
    let migration = find_migration("normalize-cost").unwrap();
    let target = FieldPath::new("cost");

    let expected = [
        ("Free", "free"),
        ("Covered by insurance", "insurance_covered"),
        ("Covered by insurance with copay", "insurance_copay"),
        ("Sliding scale (income-based)", "income_scale"),
        ("Pay what you can/donation-based", "donation"),
        ("Payment plans available", "payment_plan"),
        ("Subscription", "subscription"),
        ("One-time fee", "fee"),
        ("Free trial period", "free_trial"),
        ("Fees associated", "fee"),
    ];
    for (label, token) in expected {
        let plan = plan_document(&doc("r", json!({"cost": label})), &migration.transforms);
        assert_eq!(
            plan.updates.get(&target),
            Some(&FieldUpdate::Set(json!([token]))),
            "label {label:?}"
        );
    }

    let undeclared = plan_document(&doc("r", json!({"cost": "Unknown Plan"})), &migration.transforms);
    assert!(undeclared.is_empty());
    assert_eq!(undeclared.unrecognized.len(), 1);
    assert_eq!(undeclared.unrecognized[0].value, json!("Unknown Plan"));
}

#[test]
fn yes_no_coercion_on_rubric_answers() {
    let migration = find_migration("coerce-rubric-booleans").unwrap();
    let target = FieldPath::new("rubric.appropriate");

    let yes = plan_document(&doc("r", json!({"rubric": {"appropriate": "Yes"}})), &migration.transforms);
    assert_eq!(yes.updates.get(&target), Some(&FieldUpdate::Set(json!(true))));

    let no = plan_document(&doc("r", json!({"rubric": {"appropriate": "No"}})), &migration.transforms);
    assert_eq!(no.updates.get(&target), Some(&FieldUpdate::Set(json!(false))));

    let already = plan_document(&doc("r", json!({"rubric": {"appropriate": true}})), &migration.transforms);
    assert!(already.is_empty());
    assert!(already.unrecognized.is_empty());

    let unknown = plan_document(&doc("r", json!({"rubric": {"appropriate": "Maybe"}})), &migration.transforms);
    assert!(unknown.is_empty());
    assert_eq!(unknown.unrecognized.len(), 1);
}

#[test]
fn legacy_rubric_fields_are_tombstoned_only_when_present() {
    let migration = find_migration("drop-legacy-rubric-fields").unwrap();

    let plan = plan_document(
        &doc("r", json!({"rubric": {"avoidCond": 1, "trustworthySource": 2, "totalScore": 9}})),
        &migration.transforms,
    );
    assert_eq!(plan.updates.len(), 2);
    assert_eq!(
        plan.updates.get(&FieldPath::new("rubric.avoidCond")),
        Some(&FieldUpdate::Delete)
    );
    assert_eq!(
        plan.updates.get(&FieldPath::new("rubric.trustworthySource")),
        Some(&FieldUpdate::Delete)
    );
    assert!(!plan.updates.contains_key(&FieldPath::new("rubric.totalScore")));
}
