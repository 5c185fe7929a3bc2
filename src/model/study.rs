//! Study sessions logged by the focus timer.
//!
//! The study streak is never stored; it is derived from session start
//! days on demand, with the same consecutive-day walk habits use.

use serde::{Deserialize, Serialize};

use super::{Kind, Resource};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Pomodoro,
    Focus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub user_id: String,
    /// Epoch milliseconds
    pub start_time: i64,
    /// Epoch milliseconds
    pub end_time: i64,
    /// Duration in minutes
    pub duration: u32,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: i64,
}

impl Resource for StudySession {
    const KIND: Kind = Kind::Study;

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
        if self.start_time <= 0 || self.end_time <= 0 {
            return Err(Error::Validation(
                "study session timestamps must be positive".to_string(),
            ));
        }
        if self.end_time < self.start_time {
            return Err(Error::Validation(
                "study session must end after it starts".to_string(),
            ));
        }
        if self.duration < 1 {
            return Err(Error::Validation(
                "study session duration must be at least one minute".to_string(),
            ));
        }
        Ok(())
    }
}
