//! libSQL-backed Program repository.
//!
//! Each operation is one unit of work on the shared connection: begin, run
//! every statement through the call context, then commit only if all of
//! them succeeded. Any error (including cancellation) rolls the whole
//! transaction back before it is returned.

use std::collections::HashMap;

use chrono::Utc;
use dyel_core::ids::assign_ids;
use dyel_core::{Day, Exercise, Program, ProgramDraft};
use libsql::params::IntoParams;
use libsql::{Connection, Transaction};

use crate::ProgramDb;
use crate::context::CallContext;
use crate::error::{DatabaseError, RepoError};
use crate::helpers::{parse_datetime, parse_sets, position};
use crate::repos::ProgramRepository;

const PROGRAM_COLS: &str = "id, name, shared_by, created_at, updated_at";

const INSERT_PROGRAM: &str = "INSERT INTO programs (id, name, shared_by, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5)";

const INSERT_DAY: &str =
    "INSERT INTO days (id, program_id, position, name, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const INSERT_EXERCISE: &str = "INSERT INTO exercises
     (id, day_id, position, name, sets, reps, rest, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const DAYS_OF_PROGRAM: &str = "SELECT id, program_id, name, created_at, updated_at
     FROM days WHERE program_id = ?1 ORDER BY position";

const ALL_DAYS: &str = "SELECT id, program_id, name, created_at, updated_at
     FROM days ORDER BY program_id, position";

const EXERCISES_OF_PROGRAM: &str =
    "SELECT e.id, e.day_id, e.name, e.sets, e.reps, e.rest, e.created_at, e.updated_at
     FROM exercises e JOIN days d ON d.id = e.day_id
     WHERE d.program_id = ?1 ORDER BY d.position, e.position";

const ALL_EXERCISES: &str =
    "SELECT id, day_id, name, sets, reps, rest, created_at, updated_at
     FROM exercises ORDER BY day_id, position";

fn row_to_program(row: &libsql::Row) -> Result<Program, DatabaseError> {
    Ok(Program {
        id: row.get(0)?,
        name: row.get(1)?,
        shared_by: row.get(2)?,
        days: Vec::new(),
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

fn row_to_day(row: &libsql::Row) -> Result<Day, DatabaseError> {
    Ok(Day {
        id: row.get(0)?,
        program_id: row.get(1)?,
        name: row.get(2)?,
        exercises: Vec::new(),
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

fn row_to_exercise(row: &libsql::Row) -> Result<Exercise, DatabaseError> {
    Ok(Exercise {
        id: row.get(0)?,
        day_id: row.get(1)?,
        name: row.get(2)?,
        sets: parse_sets(row.get::<i64>(3)?)?,
        reps: row.get(4)?,
        rest: row.get(5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// Program repository over a [`ProgramDb`].
pub struct SqlProgramRepo {
    db: ProgramDb,
}

impl SqlProgramRepo {
    /// Wrap an opened (and therefore migrated) database.
    #[must_use]
    pub const fn new(db: ProgramDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ProgramDb {
        &self.db
    }
}

impl ProgramRepository for SqlProgramRepo {
    async fn create(&self, ctx: &CallContext, draft: ProgramDraft) -> Result<Program, RepoError> {
        draft.validate()?;
        ctx.check()?;
        let program = assign_ids(draft, Utc::now());

        let conn = self.db.acquire(ctx).await?;
        let tx = ctx.step(conn.transaction()).await?;
        let outcome = insert_program(&tx, ctx, &program)
            .await
            .map_err(RepoError::classify_write);
        finish(tx, ctx, outcome).await?;

        tracing::debug!(
            program_id = %program.id,
            days = program.days.len(),
            exercises = program.exercise_count(),
            "created program"
        );
        Ok(program)
    }

    async fn get(&self, ctx: &CallContext, id: &str) -> Result<Program, RepoError> {
        let conn = self.db.acquire(ctx).await?;
        let tx = ctx.step(conn.transaction()).await?;
        let outcome = load_program(&tx, ctx, id).await;
        finish(tx, ctx, outcome).await
    }

    async fn list(&self, ctx: &CallContext) -> Result<Vec<Program>, RepoError> {
        let conn = self.db.acquire(ctx).await?;
        let tx = ctx.step(conn.transaction()).await?;
        let outcome = load_all(&tx, ctx).await;
        let programs = finish(tx, ctx, outcome).await?;

        tracing::debug!(count = programs.len(), "listed programs");
        Ok(programs)
    }

    async fn update(&self, ctx: &CallContext, draft: ProgramDraft) -> Result<Program, RepoError> {
        draft.validate_for_update()?;
        ctx.check()?;
        let mut program = assign_ids(draft, Utc::now());

        let conn = self.db.acquire(ctx).await?;
        let tx = ctx.step(conn.transaction()).await?;
        let outcome = replace_program(&tx, ctx, &mut program)
            .await
            .map_err(RepoError::classify_write);
        finish(tx, ctx, outcome).await?;

        tracing::debug!(
            program_id = %program.id,
            days = program.days.len(),
            exercises = program.exercise_count(),
            "replaced program"
        );
        Ok(program)
    }

    async fn delete(&self, ctx: &CallContext, id: &str) -> Result<(), RepoError> {
        let conn = self.db.acquire(ctx).await?;
        let tx = ctx.step(conn.transaction()).await?;
        let outcome = ctx
            .step(tx.execute("DELETE FROM programs WHERE id = ?1", [id]))
            .await;
        let removed = finish(tx, ctx, outcome).await?;

        tracing::debug!(program_id = id, removed, "deleted program");
        Ok(())
    }
}

/// Commit on success, roll back on any error.
///
/// The context is checked once more before committing; once the commit has
/// started it is allowed to finish.
async fn finish<T>(
    tx: Transaction,
    ctx: &CallContext,
    outcome: Result<T, RepoError>,
) -> Result<T, RepoError> {
    match outcome.and_then(|value| ctx.check().map(|()| value)) {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = tx.rollback().await {
                tracing::warn!(%rollback_error, %error, "rollback failed");
            }
            Err(error)
        }
    }
}

async fn insert_program(
    conn: &Connection,
    ctx: &CallContext,
    program: &Program,
) -> Result<(), RepoError> {
    ctx.step(conn.execute(
        INSERT_PROGRAM,
        libsql::params![
            program.id.as_str(),
            program.name.as_str(),
            program.shared_by.as_str(),
            program.created_at.to_rfc3339(),
            program.updated_at.to_rfc3339()
        ],
    ))
    .await?;
    insert_children(conn, ctx, program).await
}

async fn insert_children(
    conn: &Connection,
    ctx: &CallContext,
    program: &Program,
) -> Result<(), RepoError> {
    for (day_index, day) in program.days.iter().enumerate() {
        ctx.step(conn.execute(
            INSERT_DAY,
            libsql::params![
                day.id.as_str(),
                day.program_id.as_str(),
                position(day_index),
                day.name.as_str(),
                day.created_at.to_rfc3339(),
                day.updated_at.to_rfc3339()
            ],
        ))
        .await?;

        for (exercise_index, exercise) in day.exercises.iter().enumerate() {
            ctx.step(conn.execute(
                INSERT_EXERCISE,
                libsql::params![
                    exercise.id.as_str(),
                    exercise.day_id.as_str(),
                    position(exercise_index),
                    exercise.name.as_str(),
                    i64::from(exercise.sets),
                    exercise.reps.as_str(),
                    exercise.rest.as_str(),
                    exercise.created_at.to_rfc3339(),
                    exercise.updated_at.to_rfc3339()
                ],
            ))
            .await?;
        }
    }
    Ok(())
}

/// Full-replace: keep the root row (and its `created_at`), drop every day
/// (exercises cascade), then insert the supplied children.
async fn replace_program(
    conn: &Connection,
    ctx: &CallContext,
    program: &mut Program,
) -> Result<(), RepoError> {
    let created_at = {
        let mut rows = ctx
            .step(conn.query(
                "SELECT created_at FROM programs WHERE id = ?1",
                [program.id.as_str()],
            ))
            .await?;
        let Some(row) = ctx.step(rows.next()).await? else {
            return Err(RepoError::NotFound {
                id: program.id.clone(),
            });
        };
        parse_datetime(&row.get::<String>(0)?)?
    };
    program.created_at = created_at;

    ctx.step(conn.execute(
        "UPDATE programs SET name = ?1, shared_by = ?2, updated_at = ?3 WHERE id = ?4",
        libsql::params![
            program.name.as_str(),
            program.shared_by.as_str(),
            program.updated_at.to_rfc3339(),
            program.id.as_str()
        ],
    ))
    .await?;
    ctx.step(conn.execute(
        "DELETE FROM days WHERE program_id = ?1",
        [program.id.as_str()],
    ))
    .await?;

    insert_children(conn, ctx, program).await
}

async fn load_program(conn: &Connection, ctx: &CallContext, id: &str) -> Result<Program, RepoError> {
    let mut program = {
        let mut rows = ctx
            .step(conn.query(
                &format!("SELECT {PROGRAM_COLS} FROM programs WHERE id = ?1"),
                [id],
            ))
            .await?;
        let row = ctx
            .step(rows.next())
            .await?
            .ok_or_else(|| RepoError::NotFound { id: id.to_string() })?;
        row_to_program(&row)?
    };

    let mut exercises = fetch_grouped(conn, ctx, EXERCISES_OF_PROGRAM, [id], |row| {
        let exercise = row_to_exercise(row)?;
        Ok((exercise.day_id.clone(), exercise))
    })
    .await?;
    let mut days = fetch_grouped(conn, ctx, DAYS_OF_PROGRAM, [id], |row| {
        let day = row_to_day(row)?;
        Ok((day.program_id.clone(), day))
    })
    .await?;

    program.days = days.remove(id).unwrap_or_default();
    attach_exercises(&mut program.days, &mut exercises);
    Ok(program)
}

async fn load_all(conn: &Connection, ctx: &CallContext) -> Result<Vec<Program>, RepoError> {
    let mut programs = Vec::new();
    {
        let mut rows = ctx
            .step(conn.query(
                &format!("SELECT {PROGRAM_COLS} FROM programs ORDER BY rowid"),
                (),
            ))
            .await?;
        while let Some(row) = ctx.step(rows.next()).await? {
            programs.push(row_to_program(&row)?);
        }
    }

    let mut exercises = fetch_grouped(conn, ctx, ALL_EXERCISES, (), |row| {
        let exercise = row_to_exercise(row)?;
        Ok((exercise.day_id.clone(), exercise))
    })
    .await?;
    let mut days = fetch_grouped(conn, ctx, ALL_DAYS, (), |row| {
        let day = row_to_day(row)?;
        Ok((day.program_id.clone(), day))
    })
    .await?;

    for program in &mut programs {
        program.days = days.remove(&program.id).unwrap_or_default();
        attach_exercises(&mut program.days, &mut exercises);
    }
    Ok(programs)
}

/// Run a child query and group rows by their back-reference, keeping the
/// order the query returned them in.
async fn fetch_grouped<T, P, F>(
    conn: &Connection,
    ctx: &CallContext,
    sql: &str,
    params: P,
    mut parse: F,
) -> Result<HashMap<String, Vec<T>>, RepoError>
where
    P: IntoParams + Send,
    F: FnMut(&libsql::Row) -> Result<(String, T), DatabaseError> + Send,
    T: Send,
{
    let mut groups: HashMap<String, Vec<T>> = HashMap::new();
    let mut rows = ctx.step(conn.query(sql, params)).await?;
    while let Some(row) = ctx.step(rows.next()).await? {
        let (parent_id, item) = parse(&row)?;
        groups.entry(parent_id).or_default().push(item);
    }
    Ok(groups)
}

fn attach_exercises(days: &mut [Day], exercises: &mut HashMap<String, Vec<Exercise>>) {
    for day in days {
        day.exercises = exercises.remove(&day.id).unwrap_or_default();
    }
}
