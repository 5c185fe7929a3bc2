//! Weekly planner time blocks.
//!
//! Blocks for the same day are allowed to overlap; the store does not
//! validate `[startHour, startHour + duration)` ranges against each other.

use serde::{Deserialize, Serialize};

use super::{Kind, Resource};
use crate::error::{Error, Result};

/// Full weekday names used by the planner grid
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockCategory {
    Work,
    Personal,
    Study,
    Fitness,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub day: String,
    pub start_hour: u32,
    pub duration: u32,
    pub category: BlockCategory,
}

impl Resource for TimeBlock {
    const KIND: Kind = Kind::Planner;

    // The planner grid is positional, not recency-ordered.
    const INSERT_AT_HEAD: bool = false;

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
        if self.title.trim().is_empty() {
            return Err(Error::Validation(
                "time block title must not be empty".to_string(),
            ));
        }
        if !WEEKDAYS.contains(&self.day.as_str()) {
            return Err(Error::Validation(format!("invalid weekday: {}", self.day)));
        }
        if self.start_hour > 23 {
            return Err(Error::Validation(format!(
                "start hour out of range: {}",
                self.start_hour
            )));
        }
        if self.duration < 1 {
            return Err(Error::Validation(
                "time block duration must be at least one hour".to_string(),
            ));
        }
        Ok(())
    }
}
