//! Local fallback namespace.
//!
//! Degraded mode for running without a remote store: each resource
//! collection is persisted wholesale under a key composed of a fixed
//! prefix, the user name and the resource kind
//! (`<prefix>_<user>_<kind>.json`). Reads deserialize the whole
//! collection; writes serialize and overwrite the whole collection.
//!
//! There is no partial-failure handling here. A failed write is logged
//! and otherwise ignored, so the collection lives on in memory only for
//! that session; a missing or corrupt file reads as empty.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{apply_patch, Resource};
use crate::storage::{self, Paths};
use crate::store::RecordStore;

/// Default storage key prefix
pub const DEFAULT_LOCAL_PREFIX: &str = "tracker";

pub struct LocalStore {
    paths: Paths,
    prefix: String,
}

impl LocalStore {
    pub fn new(paths: Paths, prefix: impl Into<String>) -> Self {
        Self {
            paths,
            prefix: prefix.into(),
        }
    }

    fn load<T: Resource>(&self, user: &str) -> Vec<T> {
        let path = self
            .paths
            .local_collection_file(&self.prefix, user, T::KIND);
        if !path.exists() {
            return Vec::new();
        }
        match storage::read_json(&path) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(
                    kind = T::KIND.path(),
                    user,
                    %err,
                    "failed to read local collection, starting empty"
                );
                Vec::new()
            }
        }
    }

    fn save<T: Resource>(&self, user: &str, records: &[T]) {
        let path = self
            .paths
            .local_collection_file(&self.prefix, user, T::KIND);
        if let Err(err) = storage::write_json(&path, &records) {
            tracing::warn!(
                kind = T::KIND.path(),
                user,
                %err,
                "failed to persist local collection, keeping it in memory only"
            );
        }
    }
}

#[async_trait]
impl<T: Resource> RecordStore<T> for LocalStore {
    async fn list(&self, user: &str) -> Result<Vec<T>> {
        Ok(self.load(user))
    }

    async fn create(&self, user: &str, mut record: T) -> Result<T> {
        record.set_user_id(user);
        record.validate()?;

        let mut records: Vec<T> = self.load(user);
        if records.iter().any(|existing| existing.id() == record.id()) {
            return Err(Error::Validation(format!(
                "{} id already exists in this scope: {}",
                T::KIND.path(),
                record.id()
            )));
        }
        records.push(record.clone());
        self.save(user, &records);
        Ok(record)
    }

    async fn update(&self, user: &str, id: &str, patch: &Value) -> Result<T> {
        let mut records: Vec<T> = self.load(user);
        let pos = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| Error::not_found(T::KIND.path(), id))?;

        let updated = apply_patch(&records[pos], patch)?;
        records[pos] = updated.clone();
        self.save(user, &records);
        Ok(updated)
    }

    async fn delete(&self, user: &str, id: &str) -> Result<()> {
        let mut records: Vec<T> = self.load(user);
        let pos = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| Error::not_found(T::KIND.path(), id))?;
        records.remove(pos);
        self.save(user, &records);
        Ok(())
    }
}
