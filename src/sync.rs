//! Optimistic sync client.
//!
//! One instance per resource kind owns the in-memory copy of the user's
//! collection for the session. Every mutation follows the same protocol:
//!
//! ```text
//! Idle -> Optimistic-Applied -> (Confirmed | RolledBack)
//! ```
//!
//! The mutation is applied to the in-memory collection first, then issued
//! to the store exactly once. On failure the captured [`Rollback`]
//! command reverts the local change and the error is recorded for the
//! caller to surface; there is no retry state. The in-memory step is
//! synchronous, so no reader ever observes a half-applied mutation.
//!
//! Derived views are recomputed from the live collection on every call
//! and therefore always reflect unconfirmed optimistic writes.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::model::{
    from_create, Goal, Habit, MoodEntry, Resource, StudySession, Task, Transaction, WorkoutLog,
};
use crate::stats;
use crate::store::RecordStore;

/// The client-side record of a failed mutation
#[derive(Debug, Clone)]
pub struct SyncError {
    /// Mutation id, assigned when the mutation was applied optimistically
    pub mutation_id: Ulid,
    /// Which operation failed (`load`, `create`, `update`, `delete`)
    pub operation: &'static str,
    pub message: String,
}

/// Inverse of an optimistic mutation, captured before the remote call.
///
/// Applying the rollback restores the collection to value-equality with
/// its pre-mutation state; a re-inserted record may land at a different
/// position.
enum Rollback<T: Resource> {
    RemoveInserted { id: String },
    RestorePrevious { prev: T },
    Reinsert { record: T },
}

impl<T: Resource> Rollback<T> {
    fn apply(self, records: &mut Vec<T>) {
        match self {
            Rollback::RemoveInserted { id } => {
                records.retain(|record| record.id() != id);
            }
            Rollback::RestorePrevious { prev } => {
                if let Some(slot) = records.iter_mut().find(|record| record.id() == prev.id()) {
                    *slot = prev;
                }
            }
            Rollback::Reinsert { record } => {
                records.push(record);
            }
        }
    }
}

/// In-memory state container for one resource kind
pub struct SyncClient<T: Resource> {
    store: Arc<dyn RecordStore<T>>,
    user: String,
    records: Vec<T>,
    loading: bool,
    last_error: Option<SyncError>,
}

impl<T: Resource> SyncClient<T> {
    pub fn new(store: Arc<dyn RecordStore<T>>, user: impl Into<String>) -> Self {
        Self {
            store,
            user: user.into(),
            records: Vec::new(),
            loading: false,
            last_error: None,
        }
    }

    /// The current collection, optimistic writes included
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&SyncError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Replace the collection with the store's contents.
    ///
    /// On failure the collection is left as it was (empty on first load)
    /// and the error is recorded.
    pub async fn load(&mut self) {
        self.loading = true;
        match self.store.list(&self.user).await {
            Ok(records) => {
                self.records = records;
                self.last_error = None;
            }
            Err(err) => {
                self.note_failure(Ulid::new(), "load", &err);
            }
        }
        self.loading = false;
    }

    /// Create a record from kind-specific fields.
    ///
    /// The id and timestamp are synthesized locally so the confirmed
    /// store copy matches the optimistic one without a reconciliation
    /// round trip. Returns the new record's id.
    pub async fn create(&mut self, fields: Value) -> Result<String> {
        let mutation_id = Ulid::new();
        let record: T = from_create(fields, &self.user)?;
        let id = record.id().to_string();

        // Same uniqueness rule the store enforces; rejecting here keeps
        // the rollback (remove-by-id) unambiguous.
        if self.records.iter().any(|held| held.id() == id) {
            return Err(Error::Validation(format!(
                "{} id already exists in this scope: {id}",
                T::KIND.path()
            )));
        }

        if T::INSERT_AT_HEAD {
            self.records.insert(0, record.clone());
        } else {
            self.records.push(record.clone());
        }
        let rollback = Rollback::RemoveInserted { id: id.clone() };

        match self.store.create(&self.user, record).await {
            Ok(_) => Ok(id),
            Err(err) => {
                rollback.apply(&mut self.records);
                self.note_failure(mutation_id, "create", &err);
                Err(err)
            }
        }
    }

    /// Merge a patch into a held record, optimistically first.
    pub async fn update(&mut self, id: &str, patch: Value) -> Result<()> {
        let mutation_id = Ulid::new();
        let pos = self
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| Error::not_found(T::KIND.path(), id))?;

        let prev = self.records[pos].clone();
        let next = crate::model::apply_patch(&prev, &patch)?;
        self.records[pos] = next;
        let rollback = Rollback::RestorePrevious { prev };

        match self.store.update(&self.user, id, &patch).await {
            Ok(_) => Ok(()),
            Err(err) => {
                rollback.apply(&mut self.records);
                self.note_failure(mutation_id, "update", &err);
                Err(err)
            }
        }
    }

    /// Remove a record, optimistically first.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let mutation_id = Ulid::new();
        let pos = self
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| Error::not_found(T::KIND.path(), id))?;

        let removed = self.records.remove(pos);
        let rollback = Rollback::Reinsert { record: removed };

        match self.store.delete(&self.user, id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                rollback.apply(&mut self.records);
                self.note_failure(mutation_id, "delete", &err);
                Err(err)
            }
        }
    }

    fn note_failure(&mut self, mutation_id: Ulid, operation: &'static str, err: &Error) {
        tracing::warn!(
            kind = T::KIND.path(),
            %mutation_id,
            operation,
            %err,
            "mutation rolled back"
        );
        self.last_error = Some(SyncError {
            mutation_id,
            operation,
            message: err.to_string(),
        });
    }
}

// =============================================================================
// Derived views per kind, recomputed on every call
// =============================================================================

impl SyncClient<Transaction> {
    pub fn balance(&self) -> f64 {
        stats::balance(&self.records)
    }

    pub fn total_income(&self) -> f64 {
        stats::total_income(&self.records)
    }

    pub fn total_expense(&self) -> f64 {
        stats::total_expense(&self.records)
    }

    pub fn category_totals(&self) -> std::collections::BTreeMap<String, f64> {
        stats::category_totals(&self.records)
    }
}

impl SyncClient<Task> {
    pub fn completion_rate(&self) -> f64 {
        stats::completion_rate(&self.records)
    }

    pub fn due_today(&self, today: NaiveDate) -> Vec<&Task> {
        stats::tasks_due_on(&self.records, today)
    }
}

impl SyncClient<Habit> {
    pub fn streak_total(&self) -> u32 {
        stats::streak_total(&self.records)
    }

    pub fn completed_on(&self, day: NaiveDate) -> usize {
        stats::habits_completed_on(&self.records, day)
    }

    /// Toggle one day's completion, bundling the new date set and the
    /// recomputed streak into a single update so the cached streak can
    /// never drift from the dates.
    pub async fn toggle_completion(
        &mut self,
        id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<()> {
        let habit = self
            .records
            .iter()
            .find(|habit| habit.id() == id)
            .ok_or_else(|| Error::not_found(Habit::KIND.path(), id))?;
        let next = habit.toggled(date, today);
        let patch = json!({
            "completedDates": next.completed_dates,
            "streak": next.streak,
        });
        self.update(id, patch).await
    }
}

impl SyncClient<MoodEntry> {
    pub fn average_mood(&self, days: i64, today: NaiveDate) -> f64 {
        stats::average_mood(&self.records, days, today)
    }
}

impl SyncClient<Goal> {
    pub fn active_goals(&self) -> usize {
        stats::active_goals(&self.records)
    }
}

impl SyncClient<WorkoutLog> {
    pub fn total_workouts(&self) -> usize {
        self.records.len()
    }

    pub fn workouts_on(&self, day: NaiveDate) -> Vec<&WorkoutLog> {
        stats::workouts_on(&self.records, day)
    }

    pub fn workouts_last_week(&self, today: NaiveDate) -> Vec<&WorkoutLog> {
        stats::workouts_in_trailing_days(&self.records, today, 7)
    }
}

impl SyncClient<StudySession> {
    pub fn total_study_minutes(&self) -> u32 {
        stats::total_study_minutes(&self.records)
    }

    pub fn study_minutes_on(&self, day: NaiveDate) -> u32 {
        stats::study_minutes_on(&self.records, day)
    }

    pub fn study_streak(&self, today: NaiveDate) -> u32 {
        stats::study_streak(&self.records, today)
    }
}
