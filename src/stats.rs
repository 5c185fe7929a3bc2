//! Derived aggregates.
//!
//! Pure, stateless functions over collection snapshots. Nothing here is
//! cached or persisted; callers recompute on every read so results always
//! match the latest in-memory state.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::model::{
    calculate_streak, Goal, GoalStatus, Habit, MoodEntry, StudySession, Task, Transaction,
    TransactionType, WorkoutLog, DATE_FORMAT,
};

pub fn total_income(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Income)
        .map(|t| t.amount)
        .sum()
}

pub fn total_expense(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense)
        .map(|t| t.amount)
        .sum()
}

pub fn balance(transactions: &[Transaction]) -> f64 {
    total_income(transactions) - total_expense(transactions)
}

/// Expense amounts grouped by category
pub fn category_totals(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for t in transactions {
        if t.transaction_type != TransactionType::Expense {
            continue;
        }
        *totals.entry(t.category.clone()).or_insert(0.0) += t.amount;
    }
    totals
}

/// Fraction of tasks completed; 0.0 for an empty collection, never NaN
pub fn completion_rate(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let completed = tasks.iter().filter(|t| t.completed).count();
    completed as f64 / tasks.len() as f64
}

/// Calendar-day equality against a wire date, not a rolling 24h window
pub fn is_same_day(raw: &str, day: NaiveDate) -> bool {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(|parsed| parsed == day)
        .unwrap_or(false)
}

/// Membership in the trailing window of `days` calendar days ending today
pub fn in_trailing_days(raw: &str, today: NaiveDate, days: i64) -> bool {
    let parsed = match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    let start = today - Duration::days(days - 1);
    parsed >= start && parsed <= today
}

pub fn tasks_due_on(tasks: &[Task], day: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.due_date.as_deref().is_some_and(|due| is_same_day(due, day)))
        .collect()
}

pub fn transactions_in_trailing_days(
    transactions: &[Transaction],
    today: NaiveDate,
    days: i64,
) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|t| in_trailing_days(&t.date, today, days))
        .collect()
}

/// Sum of cached streaks across habits
pub fn streak_total(habits: &[Habit]) -> u32 {
    habits.iter().map(|h| h.streak).sum()
}

/// Habits with a live streak
pub fn active_streaks(habits: &[Habit]) -> usize {
    habits.iter().filter(|h| h.streak > 0).count()
}

/// How many habits were marked complete on the given day
pub fn habits_completed_on(habits: &[Habit], day: NaiveDate) -> usize {
    habits
        .iter()
        .filter(|h| h.completed_dates.iter().any(|d| is_same_day(d, day)))
        .count()
}

/// Mean rating over the trailing window; 0.0 when no entries fall in it
pub fn average_mood(entries: &[MoodEntry], days: i64, today: NaiveDate) -> f64 {
    let ratings: Vec<u32> = entries
        .iter()
        .filter(|e| in_trailing_days(&e.date, today, days))
        .map(|e| e.rating)
        .collect();
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().sum::<u32>() as f64 / ratings.len() as f64
}

/// The entry journaled for a given day, if any
pub fn mood_for_day<'a>(entries: &'a [MoodEntry], day: NaiveDate) -> Option<&'a MoodEntry> {
    entries.iter().find(|e| is_same_day(&e.date, day))
}

pub fn active_goals(goals: &[Goal]) -> usize {
    goals
        .iter()
        .filter(|g| g.status == GoalStatus::Active)
        .count()
}

pub fn workouts_on(logs: &[WorkoutLog], day: NaiveDate) -> Vec<&WorkoutLog> {
    logs.iter().filter(|l| is_same_day(&l.date, day)).collect()
}

pub fn workouts_in_trailing_days(
    logs: &[WorkoutLog],
    today: NaiveDate,
    days: i64,
) -> Vec<&WorkoutLog> {
    logs.iter()
        .filter(|l| in_trailing_days(&l.date, today, days))
        .collect()
}

/// Local calendar day a session started on
fn session_day(start_millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(start_millis)
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

/// Minutes studied across all sessions
pub fn total_study_minutes(sessions: &[StudySession]) -> u32 {
    sessions.iter().map(|s| s.duration).sum()
}

/// Minutes studied in sessions started on the given day
pub fn study_minutes_on(sessions: &[StudySession], day: NaiveDate) -> u32 {
    sessions
        .iter()
        .filter(|s| session_day(s.start_time) == Some(day))
        .map(|s| s.duration)
        .sum()
}

/// Consecutive study days ending today or yesterday, derived from session
/// start days with the same walk the habit streak uses
pub fn study_streak(sessions: &[StudySession], today: NaiveDate) -> u32 {
    let days: Vec<String> = sessions
        .iter()
        .filter_map(|s| session_day(s.start_time))
        .map(|d| d.format(DATE_FORMAT).to_string())
        .collect();
    calculate_streak(&days, today)
}
