//! Habit records and the streak cache.
//!
//! `streak` is stored redundantly next to `completedDates`. The only way
//! it stays honest is that every mutation path ([`Resource::normalize`])
//! recomputes it from the dates before the record is persisted or held in
//! memory; a client-supplied streak value is always overwritten.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{parse_date, Kind, Resource, DATE_FORMAT};
use crate::error::{Error, Result};

/// Accepted frequency tags: weekday abbreviations plus the `Daily` sentinel
pub const FREQUENCY_TAGS: [&str; 8] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun", "Daily"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub frequency: Vec<String>,
    #[serde(default)]
    pub completed_dates: Vec<String>,
    #[serde(default)]
    pub streak: u32,
    pub created_at: i64,
}

impl Habit {
    /// Return a copy with `date` toggled in `completedDates` and the
    /// streak recomputed against `today`. This pairs the two fields into
    /// one value so callers can bundle them into a single update.
    pub fn toggled(&self, date: NaiveDate, today: NaiveDate) -> Habit {
        let date_str = date.format(DATE_FORMAT).to_string();
        let mut dates = self.completed_dates.clone();
        match dates.iter().position(|d| d == &date_str) {
            Some(pos) => {
                dates.remove(pos);
            }
            None => dates.push(date_str),
        }
        let streak = calculate_streak(&dates, today);
        Habit {
            completed_dates: dates,
            streak,
            ..self.clone()
        }
    }
}

impl Resource for Habit {
    const KIND: Kind = Kind::Habits;

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
                "habit title must not be empty".to_string(),
            ));
        }
        if self.frequency.is_empty() {
            return Err(Error::Validation(
                "habit frequency must not be empty".to_string(),
            ));
        }
        for tag in &self.frequency {
            if !FREQUENCY_TAGS.contains(&tag.as_str()) {
                return Err(Error::Validation(format!(
                    "invalid frequency tag: {tag}"
                )));
            }
        }
        for date in &self.completed_dates {
            parse_date(date)?;
        }
        Ok(())
    }

    fn normalize(&mut self) {
        // De-duplicate while keeping first-seen order, then refresh the cache.
        let mut seen = BTreeSet::new();
        self.completed_dates
            .retain(|date| seen.insert(date.clone()));
        self.streak = calculate_streak(&self.completed_dates, super::today());
    }
}

/// Count consecutive completed calendar days ending today or yesterday.
///
/// - Empty set: 0.
/// - Most recent completion neither `today` nor yesterday: 0 (a missed
///   day breaks the streak; it is not revived retroactively).
/// - Otherwise walk backward from the most recent date counting days with
///   no gap, the most recent included.
///
/// Duplicate dates count once; unparseable entries are skipped (they are
/// rejected at the validation boundary anyway).
pub fn calculate_streak(completed_dates: &[String], today: NaiveDate) -> u32 {
    let mut days: BTreeSet<NaiveDate> = BTreeSet::new();
    for raw in completed_dates {
        if let Ok(day) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            days.insert(day);
        }
    }

    let sorted: Vec<NaiveDate> = days.into_iter().rev().collect();
    let most_recent = match sorted.first() {
        Some(day) => *day,
        None => return 0,
    };

    let yesterday = today - Duration::days(1);
    if most_recent != today && most_recent != yesterday {
        return 0;
    }

    let mut streak = 1u32;
    let mut current = most_recent;
    for day in sorted.iter().skip(1) {
        if *day == current - Duration::days(1) {
            streak += 1;
            current = *day;
        } else {
            break;
        }
    }
    streak
}
