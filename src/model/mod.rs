//! Resource model for trk.
//!
//! Every resource kind shares the same envelope: a string `id` unique
//! within its user scope, the owning `userId`, and kind-specific fields.
//! The wire format is camelCase JSON with `createdAt` as epoch
//! milliseconds, the shape the single-page client persists.
//!
//! Two entry points funnel every mutation through validation:
//! - [`from_create`] builds a complete record from a create payload,
//!   assigning `id`/`createdAt` when the caller did not.
//! - [`apply_patch`] shallow-merges a JSON patch into an existing record,
//!   ignoring protected fields.
//!
//! Both call [`Resource::normalize`] before validating, which is where
//! derived fields (the habit streak cache) are recomputed. There is no
//! other mutation path, so the cache cannot drift.

use chrono::{Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};

mod finance;
mod goal;
mod habit;
mod mood;
mod planner;
mod study;
mod task;
mod workout;

pub use finance::{Transaction, TransactionType};
pub use goal::{Goal, GoalCategory, GoalStatus, Milestone};
pub use habit::{calculate_streak, Habit, FREQUENCY_TAGS};
pub use mood::MoodEntry;
pub use planner::{BlockCategory, TimeBlock, WEEKDAYS};
pub use study::{SessionType, StudySession};
pub use task::{Priority, Task};
pub use workout::WorkoutLog;

/// Calendar date wire format (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields a merge patch can never change
pub const PROTECTED_FIELDS: [&str; 3] = ["id", "userId", "createdAt"];

/// Resource kinds served by the API, one collection per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Tasks,
    Habits,
    Finance,
    Planner,
    Goals,
    Mood,
    Workouts,
    Study,
}

impl Kind {
    pub const ALL: [Kind; 8] = [
        Kind::Tasks,
        Kind::Habits,
        Kind::Finance,
        Kind::Planner,
        Kind::Goals,
        Kind::Mood,
        Kind::Workouts,
        Kind::Study,
    ];

    /// URL path segment for this kind (`/api/<path>`)
    pub fn path(&self) -> &'static str {
        match self {
            Kind::Tasks => "tasks",
            Kind::Habits => "habits",
            Kind::Finance => "finance",
            Kind::Planner => "planner",
            Kind::Goals => "goals",
            Kind::Mood => "mood",
            Kind::Workouts => "workouts",
            Kind::Study => "study",
        }
    }

    /// Sheet name in the workbook backend
    pub fn sheet(&self) -> &'static str {
        match self {
            Kind::Tasks => "Tasks",
            Kind::Habits => "Habits",
            Kind::Finance => "Finance",
            Kind::Planner => "Planner",
            Kind::Goals => "Goals",
            Kind::Mood => "Mood",
            Kind::Workouts => "Workouts",
            Kind::Study => "Study",
        }
    }

    /// Stable position of this kind, for per-kind writer queues
    pub fn ordinal(&self) -> usize {
        match self {
            Kind::Tasks => 0,
            Kind::Habits => 1,
            Kind::Finance => 2,
            Kind::Planner => 3,
            Kind::Goals => 4,
            Kind::Mood => 5,
            Kind::Workouts => 6,
            Kind::Study => 7,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// A record stored and synchronized per user scope
pub trait Resource:
    Clone + std::fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: Kind;

    /// New records are inserted at the head of the in-memory collection
    /// (recency order). Planner blocks append instead.
    const INSERT_AT_HEAD: bool = true;

    fn id(&self) -> &str;
    fn user_id(&self) -> &str;
    fn set_user_id(&mut self, user: &str);

    /// Check required fields and value ranges
    fn validate(&self) -> Result<()>;

    /// Re-establish derived fields after a mutation
    fn normalize(&mut self) {}
}

/// Generate a record id (client- or server-side, same generator)
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current timestamp in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Today's calendar date on the local clock
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` wire date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| Error::Validation(format!("invalid calendar date: {value}")))
}

/// Build a complete record from a create payload.
///
/// `id` and `createdAt` are kept when the payload carries them (the sync
/// client generates both locally so a confirmed create needs no
/// reconciliation); otherwise they are assigned here. `userId` is always
/// stamped from the resolved scope.
pub fn from_create<T: Resource>(body: Value, user: &str) -> Result<T> {
    let mut map = match body {
        Value::Object(map) => map,
        _ => {
            return Err(Error::Validation(
                "request body must be a JSON object".to_string(),
            ))
        }
    };

    let has_id = map
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.trim().is_empty());
    if !has_id {
        map.insert("id".to_string(), Value::String(new_record_id()));
    }

    map.insert("userId".to_string(), Value::String(user.to_string()));

    if map.get("createdAt").and_then(Value::as_i64).is_none() {
        map.insert("createdAt".to_string(), Value::from(now_millis()));
    }

    let mut record: T = serde_json::from_value(Value::Object(map))
        .map_err(|err| Error::Validation(err.to_string()))?;
    record.normalize();
    record.validate()?;
    Ok(record)
}

/// Shallow-merge a JSON patch into a record.
///
/// Top-level keys from the patch replace the record's fields; protected
/// fields are ignored. The result is re-normalized and re-validated, so a
/// patch can never leave a record in a state `from_create` would reject.
pub fn apply_patch<T: Resource>(current: &T, patch: &Value) -> Result<T> {
    let patch_map = match patch {
        Value::Object(map) => map,
        _ => {
            return Err(Error::Validation(
                "patch body must be a JSON object".to_string(),
            ))
        }
    };

    let mut map = match serde_json::to_value(current)? {
        Value::Object(map) => map,
        _ => {
            return Err(Error::OperationFailed(
                "record did not serialize to an object".to_string(),
            ))
        }
    };

    for (key, value) in patch_map {
        if PROTECTED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        map.insert(key.clone(), value.clone());
    }

    let mut updated: T = serde_json::from_value(Value::Object(map))
        .map_err(|err| Error::Validation(err.to_string()))?;
    updated.normalize();
    updated.validate()?;
    Ok(updated)
}
