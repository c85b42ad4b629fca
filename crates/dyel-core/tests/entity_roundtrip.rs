//! Serde roundtrip and JsonSchema validation tests for the aggregate types.

use chrono::Utc;
use schemars::schema_for;
use dyel_core::ids::assign_ids;
use dyel_core::{DayDraft, ExerciseDraft, Program, ProgramDraft};

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            // Serde roundtrip
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            // Schema validation
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn leg_day_draft() -> ProgramDraft {
    ProgramDraft::new("Leg Day", "alice").with_day(
        DayDraft::new("Monday").with_exercise(ExerciseDraft::new("Squat", 5, "5", "120s")),
    )
}

roundtrip_and_validate!(
    program_roundtrip,
    Program,
    assign_ids(leg_day_draft(), Utc::now())
);

roundtrip_and_validate!(program_draft_roundtrip, ProgramDraft, leg_day_draft());

roundtrip_and_validate!(
    empty_program_roundtrip,
    Program,
    assign_ids(ProgramDraft::new("Deload", "bob"), Utc::now())
);

#[test]
fn program_json_uses_wire_field_names() {
    let program = assign_ids(leg_day_draft(), Utc::now());
    let json = serde_json::to_value(&program).unwrap();

    for key in ["id", "name", "shared_by", "days", "created_at", "updated_at"] {
        assert!(json.get(key).is_some(), "program JSON missing '{key}'");
    }
    let day = &json["days"][0];
    assert_eq!(day["program_id"], json["id"]);
    let exercise = &day["exercises"][0];
    assert_eq!(exercise["day_id"], day["id"]);
    assert_eq!(exercise["sets"], 5);
    assert_eq!(exercise["reps"], "5");
    assert_eq!(exercise["rest"], "120s");
}

#[test]
fn draft_omits_absent_ids() {
    let json = serde_json::to_value(leg_day_draft()).unwrap();
    assert!(json.get("id").is_none());
    assert!(json["days"][0].get("id").is_none());
}
