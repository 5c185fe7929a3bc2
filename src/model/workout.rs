//! Workout log entries referencing an exercise from the client's library.

use serde::{Deserialize, Serialize};

use super::{parse_date, Kind, Resource};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    pub id: String,
    pub user_id: String,
    pub date: String,
    #[serde(default)]
    pub exercise_id: String,
    pub exercise_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    /// Weight in kilograms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Duration in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: i64,
}

impl Resource for WorkoutLog {
    const KIND: Kind = Kind::Workouts;

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_user_id(&mut self, user: &str) {
        self.user_id = user.to_string();
    }

    fn validate(&self) -> Result<()> {
        if self.exercise_name.trim().is_empty() {
            return Err(Error::Validation(
                "workout exercise name must not be empty".to_string(),
            ));
        }
        parse_date(&self.date)?;
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Validation(
                    "workout weight must be a non-negative number".to_string(),
                ));
            }
        }
        Ok(())
    }
}
