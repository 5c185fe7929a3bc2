//! Long-running goals with milestones and a manual progress percentage.

use serde::{Deserialize, Serialize};

use super::{parse_date, Kind, Resource};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Career,
    Health,
    Learning,
    Financial,
    Personal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: GoalCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub status: GoalStatus,
    pub created_at: i64,
}

impl Resource for Goal {
    const KIND: Kind = Kind::Goals;

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
            return Err(Error::Validation("goal title must not be empty".to_string()));
        }
        if self.progress > 100 {
            return Err(Error::Validation(format!(
                "goal progress out of range: {}",
                self.progress
            )));
        }
        if let Some(deadline) = &self.deadline {
            parse_date(deadline)?;
        }
        for milestone in &self.milestones {
            if milestone.title.trim().is_empty() {
                return Err(Error::Validation(
                    "milestone title must not be empty".to_string(),
                ));
            }
            if let Some(date) = &milestone.completed_date {
                parse_date(date)?;
            }
        }
        Ok(())
    }
}
