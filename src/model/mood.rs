//! Daily mood journal entries.

use serde::{Deserialize, Serialize};

use super::{parse_date, Kind, Resource};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub rating: u32,
    #[serde(default)]
    pub emotions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gratitude: Option<String>,
}

impl Resource for MoodEntry {
    const KIND: Kind = Kind::Mood;

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
        parse_date(&self.date)?;
        if self.rating < 1 || self.rating > 10 {
            return Err(Error::Validation(format!(
                "mood rating out of range: {}",
                self.rating
            )));
        }
        Ok(())
    }
}
