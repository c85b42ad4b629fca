use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Day;

/// Root of the aggregate: a named collection of days, attributed via `shared_by`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Program {
    pub id: String,
    pub name: String,
    pub shared_by: String,
    pub days: Vec<Day>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Program {
    /// Total number of exercises across all days.
    #[must_use]
    pub fn exercise_count(&self) -> usize {
        self.days.iter().map(|day| day.exercises.len()).sum()
    }

    /// Check that every back-reference points at its containing parent.
    #[must_use]
    pub fn back_references_hold(&self) -> bool {
        self.days.iter().all(|day| {
            day.program_id == self.id && day.exercises.iter().all(|ex| ex.day_id == day.id)
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::entities::Exercise;

    fn sample() -> Program {
        let now = Utc::now();
        Program {
            id: "p1".into(),
            name: "Push Pull".into(),
            shared_by: "alice".into(),
            days: vec![Day {
                id: "d1".into(),
                program_id: "p1".into(),
                name: "Push".into(),
                exercises: vec![Exercise {
                    id: "e1".into(),
                    day_id: "d1".into(),
                    name: "Bench".into(),
                    sets: 3,
                    reps: "8-12".into(),
                    rest: "90s".into(),
                    created_at: now,
                    updated_at: now,
                }],
                created_at: now,
                updated_at: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn back_references_hold_for_consistent_tree() {
        let program = sample();
        assert!(program.back_references_hold());
        assert_eq!(program.exercise_count(), 1);
    }

    #[test]
    fn back_references_detect_foreign_day() {
        let mut program = sample();
        program.days[0].program_id = "other".into();
        assert!(!program.back_references_hold());
    }

    #[test]
    fn back_references_detect_foreign_exercise() {
        let mut program = sample();
        program.days[0].exercises[0].day_id = "other".into();
        assert!(!program.back_references_hold());
    }
}
