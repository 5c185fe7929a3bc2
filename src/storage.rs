//! Data directory layout and durable file IO for trk.
//!
//! # Directory Structure
//!
//! ```text
//! <data_dir>/
//!   workbook.json                        # workbook backend, one sheet per kind
//!   documents/                           # document backend
//!     <kind>/<scope>/<id>.json           # one JSON document per record
//!   local/                               # local fallback namespace
//!     users.json                         # local user registry
//!     <prefix>_<user>_<kind>.json        # whole-collection files
//! ```
//!
//! All writes go through the atomic temp-file-then-rename pattern so a
//! concurrent reader never observes a partial file. Files that multiple
//! processes may write (the workbook) are additionally guarded by an
//! advisory lock on a `.lock` sibling.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::model::Kind;

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Retry interval while waiting for a contended lock
const LOCK_RETRY_INTERVAL_MS: u64 = 50;

const WORKBOOK_FILE: &str = "workbook.json";
const DOCUMENTS_DIR: &str = "documents";
const LOCAL_DIR: &str = "local";
const USERS_FILE: &str = "users.json";

/// Path layout over the trk data directory
#[derive(Debug, Clone)]
pub struct Paths {
    data_dir: PathBuf,
}

impl Paths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to the workbook backend's single file
    pub fn workbook_file(&self) -> PathBuf {
        self.data_dir.join(WORKBOOK_FILE)
    }

    /// Root of the document backend
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join(DOCUMENTS_DIR)
    }

    /// Directory holding one user scope's documents of one kind
    pub fn scope_dir(&self, kind: Kind, user: &str) -> PathBuf {
        self.documents_dir().join(kind.path()).join(path_key(user))
    }

    /// Path to a single record document
    pub fn record_file(&self, kind: Kind, user: &str, id: &str) -> PathBuf {
        self.scope_dir(kind, user)
            .join(format!("{}.json", path_key(id)))
    }

    /// Root of the local fallback namespace
    pub fn local_dir(&self) -> PathBuf {
        self.data_dir.join(LOCAL_DIR)
    }

    /// Whole-collection file for (prefix, user, kind)
    pub fn local_collection_file(&self, prefix: &str, user: &str, kind: Kind) -> PathBuf {
        self.local_dir()
            .join(format!("{}_{}_{}.json", prefix, path_key(user), kind.path()))
    }

    /// Path to the local user registry
    pub fn users_file(&self) -> PathBuf {
        self.local_dir().join(USERS_FILE)
    }

    /// Create the directory skeleton
    pub fn init_all(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(self.documents_dir())?;
        fs::create_dir_all(self.local_dir())?;
        Ok(())
    }
}

/// Sanitize an arbitrary scope or record id into a safe path component
pub fn path_key(raw: &str) -> String {
    let mut key = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            key.push(ch);
        } else {
            key.push('_');
        }
    }
    if key.is_empty() {
        "_".to_string()
    } else {
        key
    }
}

// =============================================================================
// Atomic file IO
// =============================================================================

/// Write data atomically using temp file + rename.
///
/// Readers either see the previous contents or the new contents, never a
/// partial write.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension(format!(
        "{}.tmp.{}",
        path.extension().and_then(|e| e.to_str()).unwrap_or(""),
        std::process::id()
    ));

    let mut temp_file = File::create(&temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Serialize a value as pretty JSON and write it atomically
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path, json.as_bytes())
}

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    let data: T = serde_json::from_str(&content)?;
    Ok(data)
}

/// Atomically write JSON while holding a lock on `<path>.lock`
pub fn write_json_locked<T: Serialize>(path: &Path, data: &T, timeout_ms: u64) -> Result<()> {
    let lock_path = lock_path_for(path);
    let _lock = FileLock::acquire(&lock_path, timeout_ms)?;
    write_json(path, data)
}

fn lock_path_for(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.lock", path.display()))
}

// =============================================================================
// File locking
// =============================================================================

fn is_lock_contended(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    // On Windows, fs2/libc can surface lock/sharing violations as "Other".
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

/// A file lock guard that releases the lock when dropped
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire an exclusive lock with a timeout, creating the lock file
    /// if needed.
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);
        let retry_interval = Duration::from_millis(LOCK_RETRY_INTERVAL_MS);

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(FileLock {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if is_lock_contended(&e) => {
                    if start.elapsed() >= timeout {
                        return Err(Error::LockFailed(path.to_path_buf()));
                    }
                    std::thread::sleep(retry_interval);
                }
                Err(e) => {
                    return Err(Error::Io(e));
                }
            }
        }
    }

    /// Try to acquire without waiting; `Ok(None)` when contended
    pub fn try_acquire(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(FileLock {
                file,
                path: path.to_path_buf(),
            })),
            Err(e) if is_lock_contended(&e) => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn layout_paths_are_namespaced() {
        let paths = Paths::new("/tmp/trk-data");
        assert!(paths.workbook_file().ends_with("workbook.json"));
        assert!(paths
            .record_file(Kind::Tasks, "alice", "t-1")
            .ends_with("documents/tasks/alice/t-1.json"));
        assert!(paths
            .local_collection_file("tracker", "alice", Kind::Habits)
            .ends_with("local/tracker_alice_habits.json"));
    }

    #[test]
    fn path_key_sanitizes_separators() {
        assert_eq!(path_key("user_1"), "user_1");
        assert_eq!(path_key("../evil"), "___evil");
        assert_eq!(path_key("a/b\\c"), "a_b_c");
        assert_eq!(path_key(""), "_");
    }

    #[test]
    fn atomic_write_roundtrip() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("data.json");

        write_atomic(&file_path, b"{\"key\": \"value\"}").unwrap();
        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            "{\"key\": \"value\"}"
        );

        write_atomic(&file_path, b"{}").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
    }

    #[test]
    fn json_roundtrip() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("list.json");

        write_json(&file_path, &vec!["a", "b"]).unwrap();
        let back: Vec<String> = read_json(&file_path).unwrap();
        assert_eq!(back, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn lock_is_exclusive_until_dropped() {
        let temp = TempDir::new().unwrap();
        let lock_path = temp.path().join("test.lock");

        let lock = FileLock::acquire(&lock_path, 1000).unwrap();
        assert!(FileLock::try_acquire(&lock_path).unwrap().is_none());

        drop(lock);
        assert!(FileLock::try_acquire(&lock_path).unwrap().is_some());
    }

    #[test]
    fn lock_timeout_returns_lock_failed() {
        let temp = TempDir::new().unwrap();
        let lock_path = temp.path().join("timeout.lock");

        let _held = FileLock::acquire(&lock_path, 1000).unwrap();
        let result = FileLock::acquire(&lock_path, 50);
        assert!(matches!(result, Err(Error::LockFailed(_))));
    }
}
