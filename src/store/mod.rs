//! Resource store: per-user CRUD over each resource kind.
//!
//! Three interchangeable backends serve the same contract:
//! - [`MemoryStore`]: in-process collections, nothing durable
//! - [`DocumentStore`]: one JSON document per record, per-record writes
//! - [`WorkbookStore`]: one workbook file, one sheet per kind, every
//!   write overwrites the whole sheet
//!
//! Scope isolation is absolute: a record owned by another user is
//! indistinguishable from a missing record.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::BackendKind;
use crate::error::{Error, Result};
use crate::model::Resource;
use crate::storage::Paths;

mod document;
mod memory;
mod workbook;

pub use document::DocumentStore;
pub use memory::MemoryStore;
pub use workbook::WorkbookStore;

/// Per-user CRUD over one resource kind.
///
/// `create` expects a complete record (the caller runs it through
/// `model::from_create` first) and re-stamps `userId` from the scope key.
/// `update` merges a shallow JSON patch; `id`, `userId` and `createdAt`
/// are protected. Both treat records outside the user scope as missing.
#[async_trait]
pub trait RecordStore<T: Resource>: Send + Sync {
    /// All records in the user scope, implementation-defined order
    async fn list(&self, user: &str) -> Result<Vec<T>>;

    /// Persist a record; fails if its id already exists in the scope
    async fn create(&self, user: &str, record: T) -> Result<T>;

    /// Merge `patch` into (id, user) and return the stored result
    async fn update(&self, user: &str, id: &str, patch: &Value) -> Result<T>;

    /// Remove (id, user)
    async fn delete(&self, user: &str, id: &str) -> Result<()>;
}

fn duplicate_id_error<T: Resource>(id: &str) -> Error {
    Error::Validation(format!(
        "{} id already exists in this scope: {id}",
        T::KIND.path()
    ))
}

/// Configured storage backend behind the REST contract
pub enum Backend {
    Memory(MemoryStore),
    Document(DocumentStore),
    Workbook(WorkbookStore),
}

impl Backend {
    /// Build the backend selected by configuration
    pub fn open(kind: BackendKind, paths: &Paths) -> Result<Backend> {
        match kind {
            BackendKind::Memory => Ok(Backend::Memory(MemoryStore::new())),
            BackendKind::Document => Ok(Backend::Document(DocumentStore::new(paths.clone()))),
            BackendKind::Workbook => Ok(Backend::Workbook(WorkbookStore::open(paths.clone())?)),
        }
    }
}

#[async_trait]
impl<T: Resource> RecordStore<T> for Backend {
    async fn list(&self, user: &str) -> Result<Vec<T>> {
        match self {
            Backend::Memory(store) => store.list(user).await,
            Backend::Document(store) => store.list(user).await,
            Backend::Workbook(store) => store.list(user).await,
        }
    }

    async fn create(&self, user: &str, record: T) -> Result<T> {
        match self {
            Backend::Memory(store) => store.create(user, record).await,
            Backend::Document(store) => store.create(user, record).await,
            Backend::Workbook(store) => store.create(user, record).await,
        }
    }

    async fn update(&self, user: &str, id: &str, patch: &Value) -> Result<T> {
        match self {
            Backend::Memory(store) => store.update(user, id, patch).await,
            Backend::Document(store) => store.update(user, id, patch).await,
            Backend::Workbook(store) => store.update(user, id, patch).await,
        }
    }

    async fn delete(&self, user: &str, id: &str) -> Result<()> {
        match self {
            Backend::Memory(store) => RecordStore::<T>::delete(store, user, id).await,
            Backend::Document(store) => RecordStore::<T>::delete(store, user, id).await,
            Backend::Workbook(store) => RecordStore::<T>::delete(store, user, id).await,
        }
    }
}
