//! # dyel-core
//!
//! Core types, ID assignment, and validation for dyel.
//!
//! This crate provides the foundational types shared across all dyel crates:
//! - Entity structs for the Program aggregate (program, day, exercise)
//! - Input drafts accepted by create and update, with validation
//! - Identifier assignment that turns a draft into a fully-populated aggregate
//! - Cross-cutting error types

pub mod drafts;
pub mod entities;
pub mod errors;
pub mod ids;

pub use drafts::{DayDraft, ExerciseDraft, ProgramDraft};
pub use entities::{Day, Exercise, Program};
pub use errors::CoreError;
