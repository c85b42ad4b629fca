//! Identifier assignment for the Program aggregate.
//!
//! IDs are random 128-bit UUIDv4 strings. Assignment walks the tree top-down
//! so every child row already carries its parent's id before anything is
//! written: no write-then-patch pass.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::drafts::{DayDraft, ExerciseDraft, ProgramDraft};
use crate::entities::{Day, Exercise, Program};

/// Generate a fresh random identifier.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Keep a supplied id, or generate one if absent.
#[must_use]
pub fn ensure_id(id: Option<String>) -> String {
    id.unwrap_or_else(new_id)
}

/// Turn a draft into a fully-populated aggregate.
///
/// Missing ids are generated, back-references are derived from the
/// containing parent, and every node is stamped with `now` for both
/// `created_at` and `updated_at`. The draft is consumed; the caller's input
/// is never patched in place.
#[must_use]
pub fn assign_ids(draft: ProgramDraft, now: DateTime<Utc>) -> Program {
    let id = ensure_id(draft.id);
    let days = draft
        .days
        .into_iter()
        .map(|day| assign_day(day, &id, now))
        .collect();

    Program {
        id,
        name: draft.name,
        shared_by: draft.shared_by,
        days,
        created_at: now,
        updated_at: now,
    }
}

fn assign_day(draft: DayDraft, program_id: &str, now: DateTime<Utc>) -> Day {
    let id = ensure_id(draft.id);
    let exercises = draft
        .exercises
        .into_iter()
        .map(|exercise| assign_exercise(exercise, &id, now))
        .collect();

    Day {
        id,
        program_id: program_id.to_string(),
        name: draft.name,
        exercises,
        created_at: now,
        updated_at: now,
    }
}

fn assign_exercise(draft: ExerciseDraft, day_id: &str, now: DateTime<Utc>) -> Exercise {
    Exercise {
        id: ensure_id(draft.id),
        day_id: day_id.to_string(),
        name: draft.name,
        sets: draft.sets,
        reps: draft.reps,
        rest: draft.rest,
        created_at: now,
        updated_at: now,
    }
}
