//! In-memory store backend.
//!
//! Rows are kept as raw JSON values in one collection per kind so a
//! single instance can serve every resource kind. Used for tests and
//! ephemeral serving; nothing survives the process.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{duplicate_id_error, RecordStore};
use crate::error::{Error, Result};
use crate::model::{apply_patch, Resource};

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<&'static str, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn row_matches(row: &Value, user: &str, id: Option<&str>) -> bool {
    let owner = row.get("userId").and_then(Value::as_str);
    if owner != Some(user) {
        return false;
    }
    match id {
        Some(id) => row.get("id").and_then(Value::as_str) == Some(id),
        None => true,
    }
}

fn decode<T: Resource>(row: &Value) -> Result<T> {
    serde_json::from_value(row.clone()).map_err(|err| Error::Store(err.to_string()))
}

#[async_trait]
impl<T: Resource> RecordStore<T> for MemoryStore {
    async fn list(&self, user: &str) -> Result<Vec<T>> {
        let collections = self.collections.lock().await;
        let rows = match collections.get(T::KIND.path()) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };
        rows.iter()
            .filter(|row| row_matches(row, user, None))
            .map(decode)
            .collect()
    }

    async fn create(&self, user: &str, mut record: T) -> Result<T> {
        record.set_user_id(user);
        record.validate()?;

        let mut collections = self.collections.lock().await;
        let rows = collections.entry(T::KIND.path()).or_default();
        if rows.iter().any(|row| row_matches(row, user, Some(record.id()))) {
            return Err(duplicate_id_error::<T>(record.id()));
        }
        rows.push(serde_json::to_value(&record)?);
        Ok(record)
    }

    async fn update(&self, user: &str, id: &str, patch: &Value) -> Result<T> {
        let mut collections = self.collections.lock().await;
        let rows = collections.entry(T::KIND.path()).or_default();
        let pos = rows
            .iter()
            .position(|row| row_matches(row, user, Some(id)))
            .ok_or_else(|| Error::not_found(T::KIND.path(), id))?;

        let current: T = decode(&rows[pos])?;
        let updated = apply_patch(&current, patch)?;
        rows[pos] = serde_json::to_value(&updated)?;
        Ok(updated)
    }

    async fn delete(&self, user: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.lock().await;
        let rows = collections.entry(T::KIND.path()).or_default();
        let pos = rows
            .iter()
            .position(|row| row_matches(row, user, Some(id)))
            .ok_or_else(|| Error::not_found(T::KIND.path(), id))?;
        rows.remove(pos);
        Ok(())
    }
}
