//! Spreadsheet-file-backed store.
//!
//! A single workbook file holds one sheet (a JSON array of rows) per
//! resource kind. There is no per-record write: every mutation re-reads
//! the workbook, replaces the whole sheet, and rewrites the whole file.
//! Concurrent writers from different processes clobber each other at
//! sheet granularity (last writer wins); within one process, writes to a
//! sheet are serialized through a per-kind writer mutex, and the file
//! itself is guarded by an advisory lock so individual rewrites stay
//! atomic across processes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{duplicate_id_error, RecordStore};
use crate::error::{Error, Result};
use crate::model::{apply_patch, Kind, Resource};
use crate::storage::{self, Paths, DEFAULT_LOCK_TIMEOUT_MS};

type Workbook = BTreeMap<String, Vec<Value>>;

pub struct WorkbookStore {
    paths: Paths,
    // One writer queue per sheet, indexed by Kind::ordinal
    writers: [Mutex<()>; 8],
}

impl WorkbookStore {
    /// Open the workbook, creating it with empty sheets on first use
    pub fn open(paths: Paths) -> Result<Self> {
        let store = Self {
            paths,
            writers: std::array::from_fn(|_| Mutex::new(())),
        };
        if !store.paths.workbook_file().exists() {
            let mut workbook = Workbook::new();
            for kind in Kind::ALL {
                workbook.insert(kind.sheet().to_string(), Vec::new());
            }
            store.write_workbook(&workbook)?;
        }
        Ok(store)
    }

    fn writer(&self, kind: Kind) -> &Mutex<()> {
        &self.writers[kind.ordinal()]
    }

    fn read_workbook(&self) -> Result<Workbook> {
        let path = self.paths.workbook_file();
        if !path.exists() {
            return Ok(Workbook::new());
        }
        storage::read_json(&path).map_err(|err| Error::Store(format!("corrupt workbook: {err}")))
    }

    fn write_workbook(&self, workbook: &Workbook) -> Result<()> {
        storage::write_json_locked(
            &self.paths.workbook_file(),
            workbook,
            DEFAULT_LOCK_TIMEOUT_MS,
        )
    }

    fn sheet_rows<'a>(workbook: &'a Workbook, kind: Kind) -> &'a [Value] {
        workbook
            .get(kind.sheet())
            .map(Vec::as_slice)
            .unwrap_or_default()
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
impl<T: Resource> RecordStore<T> for WorkbookStore {
    async fn list(&self, user: &str) -> Result<Vec<T>> {
        let workbook = self.read_workbook()?;
        Self::sheet_rows(&workbook, T::KIND)
            .iter()
            .filter(|row| row_matches(row, user, None))
            .map(decode)
            .collect()
    }

    async fn create(&self, user: &str, mut record: T) -> Result<T> {
        record.set_user_id(user);
        record.validate()?;

        let _writer = self.writer(T::KIND).lock().await;
        let mut workbook = self.read_workbook()?;
        let rows = workbook.entry(T::KIND.sheet().to_string()).or_default();
        if rows.iter().any(|row| row_matches(row, user, Some(record.id()))) {
            return Err(duplicate_id_error::<T>(record.id()));
        }
        rows.push(serde_json::to_value(&record)?);
        self.write_workbook(&workbook)?;
        Ok(record)
    }

    async fn update(&self, user: &str, id: &str, patch: &Value) -> Result<T> {
        let _writer = self.writer(T::KIND).lock().await;
        let mut workbook = self.read_workbook()?;
        let rows = workbook.entry(T::KIND.sheet().to_string()).or_default();
        let pos = rows
            .iter()
            .position(|row| row_matches(row, user, Some(id)))
            .ok_or_else(|| Error::not_found(T::KIND.path(), id))?;

        let current: T = decode(&rows[pos])?;
        let updated = apply_patch(&current, patch)?;
        rows[pos] = serde_json::to_value(&updated)?;
        self.write_workbook(&workbook)?;
        Ok(updated)
    }

    async fn delete(&self, user: &str, id: &str) -> Result<()> {
        let _writer = self.writer(T::KIND).lock().await;
        let mut workbook = self.read_workbook()?;
        let rows = workbook.entry(T::KIND.sheet().to_string()).or_default();
        let pos = rows
            .iter()
            .position(|row| row_matches(row, user, Some(id)))
            .ok_or_else(|| Error::not_found(T::KIND.path(), id))?;
        rows.remove(pos);
        self.write_workbook(&workbook)?;
        Ok(())
    }
}
