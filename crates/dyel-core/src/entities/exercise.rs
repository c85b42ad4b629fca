use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One movement within a day. `reps` and `rest` are free-form (`"8-12"`, `"90s"`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub day_id: String,
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub rest: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
