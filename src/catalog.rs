//! The registered migrations for the `resources` collection.
//!
//! Each migration is a named list of declarative transforms; the runner
//! supplies traversal, dry-run handling, and reporting. New migrations are
//! added here as data rather than as new control flow.

use serde_json::{Value, json};

use crate::paths::FieldPath;
use crate::transform::{FieldTransform, ValueSource, ValueTable};

/// A named, self-contained migration over a single collection.
#[derive(Debug, Clone)]
pub struct Migration {
    pub name: &'static str,
    pub description: &'static str,
    pub collection: &'static str,
    pub transforms: Vec<FieldTransform>,
}

const RESOURCES: &str = "resources";

/// Cost labels as they were originally entered, mapped to normalized tokens.
fn cost_table() -> ValueTable {
    ValueTable::new([
        (json!("Free"), json!("free")),
        (json!("Covered by insurance"), json!("insurance_covered")),
        (json!("Covered by insurance with copay"), json!("insurance_copay")),
        (json!("Sliding scale (income-based)"), json!("income_scale")),
        (json!("Pay what you can/donation-based"), json!("donation")),
        (json!("Payment plans available"), json!("payment_plan")),
        (json!("Subscription"), json!("subscription")),
        (json!("One-time fee"), json!("fee")),
        (json!("Free trial period"), json!("free_trial")),
        (json!("Fees associated"), json!("fee")),
    ])
}

/// Legacy 0-5 responsiveness scores mapped to level names.
fn responsiveness_levels() -> ValueTable {
    ValueTable::new([
        (json!(0), json!("none")),
        (json!(1), json!("low")),
        (json!(2), json!("some")),
        (json!(3), json!("good")),
        (json!(4), json!("high")),
        (json!(5), json!("high")),
        (json!(-1), json!("")),
    ])
}

/// Rubric scoring fields retired by the rubric redesign.
const LEGACY_RUBRIC_FIELDS: &[&str] = &[
    "avoidAgeism",
    "avoidAppropriation",
    "avoidCond",
    "avoidLanguage",
    "avoidRacism",
    "avoidSexism",
    "avoidStereotyping",
    "contentAccurate",
    "contentCurrent",
    "contentTrustworthy",
    "experienceBalance",
    "accurate",
    "authenticity",
    "consistency",
    "culturallyGrounded",
    "current",
    "language",
    "modularizable",
    "notMorallyOffensive",
    "productionValue",
    "relevance",
    "socialSupport",
    "trustworthySource",
];

fn ensure(path: &str, value: Value) -> FieldTransform {
    FieldTransform::EnsureField {
        path: FieldPath::new(path),
        source: ValueSource::Const(value),
    }
}

fn ensure_from(path: &str, legacy: &str, default: Value) -> FieldTransform {
    FieldTransform::EnsureField {
        path: FieldPath::new(path),
        source: ValueSource::CopyFrom {
            source: FieldPath::new(legacy),
            default,
        },
    }
}

fn remove(path: &str) -> FieldTransform {
    FieldTransform::RemoveField {
        path: FieldPath::new(path),
    }
}

/// Every known migration, in the order they were rolled out.
pub fn registered_migrations() -> Vec<Migration> {
    vec![
        Migration {
            name: "add-cultural-responsiveness",
            description: "Add culturalResponsiveness derived from the legacy integer score",
            collection: RESOURCES,
            transforms: vec![FieldTransform::EnsureField {
                path: FieldPath::new("culturalResponsiveness"),
                source: ValueSource::MapFrom {
                    source: FieldPath::new("culturalResponsivness"),
                    table: responsiveness_levels(),
                    fallback: Some(json!("")),
                },
            }],
        },
        Migration {
            name: "backfill-rubric-defaults",
            description: "Add missing rubric fields, seeding renamed scores from their legacy counterparts",
            collection: RESOURCES,
            transforms: vec![
                ensure("rubric.accessibilityFeatures", json!([])),
                ensure("rubric.additionalComments", Value::Null),
                ensure("rubric.ageBalance", Value::Null),
                ensure("rubric.appropriate", json!(true)),
                ensure("rubric.avoidsAgeism", json!(true)),
                ensure("rubric.avoidsAppropriation", json!(true)),
                ensure("rubric.avoidsCondescension", json!(true)),
                ensure("rubric.avoidsRacism", json!(true)),
                ensure("rubric.avoidsSexism", json!(true)),
                ensure("rubric.avoidsStereotyping", json!(true)),
                ensure("rubric.avoidsVulgarity", json!(true)),
                ensure_from("rubric.contentAccuracy", "rubric.contentAccurate", json!(0)),
                ensure_from("rubric.contentCurrentness", "rubric.contentCurrent", json!(0)),
                ensure_from("rubric.contentTrustworthiness", "rubric.contentTrustworthy", json!(0)),
                ensure("rubric.culturalGroundednessHopi", json!(0)),
                ensure("rubric.culturalGroundednessIndigenous", json!(0)),
                ensure("rubric.genderBalance", json!([])),
                ensure("rubric.lifeExperiences", json!([])),
                ensure("rubric.queerSexualitySpecific", json!(false)),
                ensure("rubric.totalScore", json!(0)),
            ],
        },
        Migration {
            name: "normalize-cost",
            description: "Convert cost values to a list of normalized tokens",
            collection: RESOURCES,
            transforms: vec![FieldTransform::RemapValues {
                path: FieldPath::new("cost"),
                table: cost_table(),
                to_list: true,
            }],
        },
        Migration {
            name: "coerce-rubric-booleans",
            description: "Coerce Yes/No rubric answers to booleans",
            collection: RESOURCES,
            transforms: vec![FieldTransform::RemapValues {
                path: FieldPath::new("rubric.appropriate"),
                table: ValueTable::new([(json!("Yes"), json!(true)), (json!("No"), json!(false))]),
                to_list: false,
            }],
        },
        Migration {
            name: "drop-legacy-cultural-fields",
            description: "Remove the superseded cultural response fields",
            collection: RESOURCES,
            transforms: vec![remove("culturalResponse"), remove("culturalResponsivness")],
        },
        Migration {
            name: "drop-legacy-rubric-fields",
            description: "Remove rubric fields retired by the rubric redesign",
            collection: RESOURCES,
            transforms: LEGACY_RUBRIC_FIELDS
                .iter()
                .map(|field| remove(&format!("rubric.{field}")))
                .collect(),
        },
    ]
}

/// Look up one migration by name.
pub fn find_migration(name: &str) -> Option<Migration> {
    registered_migrations().into_iter().find(|m| m.name == name)
}
