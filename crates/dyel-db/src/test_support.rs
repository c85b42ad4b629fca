//! Shared test utilities for dyel-db unit tests.

pub(crate) mod helpers {
    use dyel_core::{DayDraft, ExerciseDraft, ProgramDraft};

    use crate::ProgramDb;
    use crate::repos::program::SqlProgramRepo;

    /// Create a repository over a fresh in-memory database.
    pub async fn test_repo() -> SqlProgramRepo {
        let db = ProgramDb::open_local(":memory:").await.unwrap();
        SqlProgramRepo::new(db)
    }

    /// One day, one exercise.
    pub fn leg_day() -> ProgramDraft {
        ProgramDraft::new("Leg Day", "alice").with_day(
            DayDraft::new("Monday").with_exercise(ExerciseDraft::new("Squat", 5, "5", "120s")),
        )
    }

    pub async fn count_rows(db: &ProgramDb, table: &str) -> i64 {
        let conn = db.conn().await;
        let mut rows = conn
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }
}
