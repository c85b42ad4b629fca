//! Entity structs for the Program aggregate.
//!
//! Each entity maps to a table in the libSQL database (`programs`, `days`,
//! `exercises`). All structs derive `Serialize`, `Deserialize`, and
//! `JsonSchema` for JSON roundtrip and schema validation.

mod day;
mod exercise;
mod program;

pub use day::Day;
pub use exercise::Exercise;
pub use program::Program;
