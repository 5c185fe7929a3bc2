//! Document-oriented store backend.
//!
//! One JSON document per record at `documents/<kind>/<scope>/<id>.json`,
//! giving per-record write granularity. User scoping falls out of the
//! directory layout; listing another user's scope reads another
//! directory, so leakage is structurally impossible.

use async_trait::async_trait;
use serde_json::Value;

use super::{duplicate_id_error, RecordStore};
use crate::error::{Error, Result};
use crate::model::{apply_patch, Resource};
use crate::storage::{self, Paths};

pub struct DocumentStore {
    paths: Paths,
}

impl DocumentStore {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl<T: Resource> RecordStore<T> for DocumentStore {
    async fn list(&self, user: &str) -> Result<Vec<T>> {
        let scope_dir = self.paths.scope_dir(T::KIND, user);
        if !scope_dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&scope_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let record: T = storage::read_json(&path)
                .map_err(|err| Error::Store(format!("corrupt document: {err}")))?;
            records.push(record);
        }
        Ok(records)
    }

    async fn create(&self, user: &str, mut record: T) -> Result<T> {
        record.set_user_id(user);
        record.validate()?;

        let path = self.paths.record_file(T::KIND, user, record.id());
        if path.exists() {
            return Err(duplicate_id_error::<T>(record.id()));
        }
        storage::write_json(&path, &record)?;
        Ok(record)
    }

    async fn update(&self, user: &str, id: &str, patch: &Value) -> Result<T> {
        let path = self.paths.record_file(T::KIND, user, id);
        if !path.exists() {
            return Err(Error::not_found(T::KIND.path(), id));
        }

        let current: T = storage::read_json(&path)
            .map_err(|err| Error::Store(format!("corrupt document: {err}")))?;
        let updated = apply_patch(&current, patch)?;
        storage::write_json(&path, &updated)?;
        Ok(updated)
    }

    async fn delete(&self, user: &str, id: &str) -> Result<()> {
        let path = self.paths.record_file(T::KIND, user, id);
        if !path.exists() {
            return Err(Error::not_found(T::KIND.path(), id));
        }
        std::fs::remove_file(&path)?;
        Ok(())
    }
}
