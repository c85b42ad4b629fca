//! In-memory Program repository.
//!
//! Same contract as the libSQL repository, kept in a `Vec` so listing order
//! is creation order. Adapter tests use it to run without a database file.

use std::collections::HashSet;

use chrono::Utc;
use dyel_core::ids::assign_ids;
use dyel_core::{Program, ProgramDraft};
use tokio::sync::Mutex;

use crate::context::CallContext;
use crate::error::RepoError;
use crate::repos::ProgramRepository;

#[derive(Default)]
pub struct MemoryProgramRepo {
    programs: Mutex<Vec<Program>>,
}

impl MemoryProgramRepo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn day_ids(program: &Program) -> impl Iterator<Item = &str> {
    program.days.iter().map(|day| day.id.as_str())
}

fn exercise_ids(program: &Program) -> impl Iterator<Item = &str> {
    program
        .days
        .iter()
        .flat_map(|day| day.exercises.iter().map(|e| e.id.as_str()))
}

/// Reject ids already used at the same level by any stored aggregate other
/// than `skip`. Programs, days and exercises each have their own id space,
/// as the tables do.
fn ensure_unused(stored: &[Program], candidate: &Program, skip: Option<&str>) -> Result<(), RepoError> {
    let others: Vec<&Program> = stored
        .iter()
        .filter(|p| Some(p.id.as_str()) != skip)
        .collect();

    if skip.is_none() && others.iter().any(|p| p.id == candidate.id) {
        return Err(conflict("programs", &candidate.id));
    }

    let taken: HashSet<&str> = others.iter().copied().flat_map(day_ids).collect();
    if let Some(id) = day_ids(candidate).find(|id| taken.contains(id)) {
        return Err(conflict("days", id));
    }

    let taken: HashSet<&str> = others.iter().copied().flat_map(exercise_ids).collect();
    if let Some(id) = exercise_ids(candidate).find(|id| taken.contains(id)) {
        return Err(conflict("exercises", id));
    }
    Ok(())
}

fn conflict(table: &str, id: &str) -> RepoError {
    RepoError::Conflict(format!("{table}.id '{id}' already exists"))
}

impl ProgramRepository for MemoryProgramRepo {
    async fn create(&self, ctx: &CallContext, draft: ProgramDraft) -> Result<Program, RepoError> {
        draft.validate()?;
        ctx.check()?;
        let program = assign_ids(draft, Utc::now());

        let mut programs = ctx.run(self.programs.lock()).await?;
        ensure_unused(&programs, &program, None)?;
        ctx.check()?;
        programs.push(program.clone());
        Ok(program)
    }

    async fn get(&self, ctx: &CallContext, id: &str) -> Result<Program, RepoError> {
        let programs = ctx.run(self.programs.lock()).await?;
        programs
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound { id: id.to_string() })
    }

    async fn list(&self, ctx: &CallContext) -> Result<Vec<Program>, RepoError> {
        let programs = ctx.run(self.programs.lock()).await?;
        Ok(programs.clone())
    }

    async fn update(&self, ctx: &CallContext, draft: ProgramDraft) -> Result<Program, RepoError> {
        draft.validate_for_update()?;
        ctx.check()?;
        let mut program = assign_ids(draft, Utc::now());

        let mut programs = ctx.run(self.programs.lock()).await?;
        let Some(index) = programs.iter().position(|p| p.id == program.id) else {
            return Err(RepoError::NotFound { id: program.id });
        };
        ensure_unused(&programs, &program, Some(&program.id))?;
        ctx.check()?;

        program.created_at = programs[index].created_at;
        programs[index] = program.clone();
        Ok(program)
    }

    async fn delete(&self, ctx: &CallContext, id: &str) -> Result<(), RepoError> {
        let mut programs = ctx.run(self.programs.lock()).await?;
        ctx.check()?;
        programs.retain(|p| p.id != id);
        Ok(())
    }
}
