//! Input shapes accepted by create and update.
//!
//! Drafts carry optional ids and no back-references or timestamps. Unknown
//! JSON fields are ignored, so a fetched `Program` can be posted back as a
//! draft: its `program_id`/`day_id`/timestamp fields are dropped and
//! re-derived from the containing parent on write.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A program as submitted by a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProgramDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub shared_by: String,
    /// Must be present, though it may be empty.
    pub days: Vec<DayDraft>,
}

/// A day as submitted by a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DayDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseDraft>,
}

/// An exercise as submitted by a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExerciseDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub rest: String,
}

impl ProgramDraft {
    /// Start a draft with the two required root fields.
    pub fn new(name: impl Into<String>, shared_by: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            shared_by: shared_by.into(),
            days: Vec::new(),
        }
    }

    /// Builder-style: append a day.
    #[must_use]
    pub fn with_day(mut self, day: DayDraft) -> Self {
        self.days.push(day);
        self
    }

    /// Builder-style: set an explicit root id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Validate field-level rules for the whole tree.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending path.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)?;
        require_text("shared_by", &self.shared_by)?;

        let mut seen = HashSet::new();
        check_id("id", self.id.as_deref(), &mut seen)?;

        for (di, day) in self.days.iter().enumerate() {
            let path = format!("days[{di}]");
            check_id(&format!("{path}.id"), day.id.as_deref(), &mut seen)?;
            require_text(&format!("{path}.name"), &day.name)?;

            for (ei, exercise) in day.exercises.iter().enumerate() {
                let path = format!("{path}.exercises[{ei}]");
                check_id(&format!("{path}.id"), exercise.id.as_deref(), &mut seen)?;
                require_text(&format!("{path}.name"), &exercise.name)?;
            }
        }
        Ok(())
    }

    /// Validate a draft destined for update, which must carry its root id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the root id is missing or any
    /// field-level rule fails.
    pub fn validate_for_update(&self) -> Result<(), CoreError> {
        match self.id.as_deref() {
            Some(id) if !id.trim().is_empty() => self.validate(),
            _ => Err(CoreError::validation("id is required for update")),
        }
    }
}

impl DayDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            exercises: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_exercise(mut self, exercise: ExerciseDraft) -> Self {
        self.exercises.push(exercise);
        self
    }
}

impl ExerciseDraft {
    pub fn new(
        name: impl Into<String>,
        sets: u32,
        reps: impl Into<String>,
        rest: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            sets,
            reps: reps.into(),
            rest: rest.into(),
        }
    }
}

fn require_text(path: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(format!("{path} must not be blank")));
    }
    Ok(())
}

fn check_id<'a>(
    path: &str,
    id: Option<&'a str>,
    seen: &mut HashSet<&'a str>,
) -> Result<(), CoreError> {
    let Some(id) = id else {
        return Ok(());
    };
    if id.trim().is_empty() {
        return Err(CoreError::validation(format!("{path} must not be blank")));
    }
    if !seen.insert(id) {
        return Err(CoreError::validation(format!(
            "{path} duplicates an id already used in this program: {id}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn leg_day() -> ProgramDraft {
        ProgramDraft::new("Leg Day", "alice").with_day(
            DayDraft::new("Monday").with_exercise(ExerciseDraft::new("Squat", 5, "5", "120s")),
        )
    }

    #[test]
    fn valid_draft_passes() {
        assert_eq!(leg_day().validate(), Ok(()));
    }

    #[test]
    fn empty_days_are_allowed() {
        assert!(ProgramDraft::new("Rest Week", "bob").validate().is_ok());
    }

    #[rstest]
    #[case::blank_name(ProgramDraft { name: "  ".into(), ..leg_day() }, "name must not be blank")]
    #[case::blank_shared_by(ProgramDraft { shared_by: String::new(), ..leg_day() }, "shared_by must not be blank")]
    #[case::blank_root_id(leg_day().with_id(""), "id must not be blank")]
    #[case::blank_day_name(
        ProgramDraft::new("P", "a").with_day(DayDraft::new("")),
        "days[0].name must not be blank"
    )]
    #[case::blank_exercise_name(
        ProgramDraft::new("P", "a")
            .with_day(DayDraft::new("Mon"))
            .with_day(DayDraft::new("Tue").with_exercise(ExerciseDraft::new(" ", 3, "10", "60s"))),
        "days[1].exercises[0].name must not be blank"
    )]
    fn invalid_drafts_name_the_path(#[case] draft: ProgramDraft, #[case] expected: &str) {
        let err = draft.validate().unwrap_err();
        assert_eq!(err, CoreError::Validation(expected.to_string()));
    }

    #[test]
    fn duplicate_ids_within_aggregate_are_rejected() {
        let mut day_a = DayDraft::new("A");
        day_a.id = Some("same".into());
        let mut day_b = DayDraft::new("B");
        day_b.id = Some("same".into());
        let draft = ProgramDraft::new("P", "a").with_day(day_a).with_day(day_b);

        let err = draft.validate().unwrap_err();
        assert!(
            matches!(&err, CoreError::Validation(msg) if msg.starts_with("days[1].id duplicates")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn update_requires_root_id() {
        assert_eq!(
            leg_day().validate_for_update(),
            Err(CoreError::validation("id is required for update"))
        );
        assert!(leg_day().with_id("p-1").validate_for_update().is_ok());
    }

    #[test]
    fn fetched_program_json_deserializes_as_draft() {
        let json = serde_json::json!({
            "id": "p-1",
            "name": "Leg Day",
            "shared_by": "alice",
            "created_at": "2026-01-01T00:00:00Z",
            "days": [{
                "id": "d-1",
                "program_id": "p-1",
                "name": "Monday",
                "exercises": [{
                    "id": "e-1",
                    "day_id": "d-1",
                    "name": "Squat",
                    "sets": 5,
                    "reps": "5",
                    "rest": "120s"
                }]
            }]
        });

        let draft: ProgramDraft = serde_json::from_value(json).unwrap();
        assert_eq!(draft.id.as_deref(), Some("p-1"));
        assert_eq!(draft.days[0].id.as_deref(), Some("d-1"));
        assert_eq!(draft.days[0].exercises[0].sets, 5);
    }

    #[test]
    fn days_must_be_present_but_may_be_empty() {
        let missing = serde_json::from_str::<ProgramDraft>(r#"{"name":"P","shared_by":"a"}"#)
            .unwrap_err();
        assert!(missing.to_string().contains("missing field `days`"));

        let empty: ProgramDraft =
            serde_json::from_str(r#"{"name":"P","shared_by":"a","days":[]}"#).unwrap();
        assert!(empty.days.is_empty());
    }

    #[test]
    fn negative_sets_fail_to_deserialize() {
        let json = r#"{"name":"P","shared_by":"a","days":[{"name":"D","exercises":[{"name":"E","sets":-1}]}]}"#;
        assert!(serde_json::from_str::<ProgramDraft>(json).is_err());
    }
}
