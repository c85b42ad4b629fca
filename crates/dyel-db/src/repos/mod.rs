//! The Program aggregate repository.
//!
//! [`ProgramRepository`] is the single capability surface adapters call.
//! [`program::SqlProgramRepo`] backs it with libSQL; [`memory::MemoryProgramRepo`]
//! is an in-memory stand-in with the same contract for adapter tests.
//!
//! Contract shared by both implementations:
//! - `create` validates, assigns missing ids, and writes the whole tree
//!   atomically.
//! - `update` is full-replace: the root row is updated in place (keeping
//!   `created_at`), every existing day is deleted (cascading to exercises),
//!   and the supplied days are inserted with fresh timestamps.
//! - `get` of an unknown id is `NotFound`; `delete` of an unknown id succeeds.
//! - Concurrent updates of one program are last-write-wins.

pub mod memory;
pub mod program;

use std::future::Future;

use dyel_core::{Program, ProgramDraft};

use crate::context::CallContext;
use crate::error::RepoError;

pub trait ProgramRepository: Send + Sync {
    /// Persist a new aggregate and return it with all ids and timestamps.
    fn create(
        &self,
        ctx: &CallContext,
        draft: ProgramDraft,
    ) -> impl Future<Output = Result<Program, RepoError>> + Send;

    /// Fetch one aggregate with its full subtree.
    fn get(
        &self,
        ctx: &CallContext,
        id: &str,
    ) -> impl Future<Output = Result<Program, RepoError>> + Send;

    /// Fetch every aggregate in storage order. Unpaginated.
    fn list(&self, ctx: &CallContext) -> impl Future<Output = Result<Vec<Program>, RepoError>> + Send;

    /// Replace an existing aggregate. `draft.id` is required.
    fn update(
        &self,
        ctx: &CallContext,
        draft: ProgramDraft,
    ) -> impl Future<Output = Result<Program, RepoError>> + Send;

    /// Remove an aggregate and its subtree. Unknown ids are not an error.
    fn delete(&self, ctx: &CallContext, id: &str) -> impl Future<Output = Result<(), RepoError>> + Send;
}
