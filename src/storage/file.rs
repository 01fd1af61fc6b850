//! Persistent storage mirrored to a JSON document on disk.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::{check_quota, StorageBackend, StorageResult};
use crate::error::StorageError;

// == File Storage ==
/// Backend that survives restarts.
///
/// The full map lives in memory and the document at `path` is rewritten after
/// every mutation (temp file + rename). A batch removal is one mutation and
/// one rewrite. A mutation that cannot be persisted is rolled back so memory
/// and disk never disagree.
///
/// Calls block on file I/O; async callers should run them on the blocking
/// pool.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
    persists: AtomicUsize,
}

impl FileStorage {
    /// Opens (or lazily creates) the document at `path`.
    ///
    /// A missing file is an empty store. A file that exists but is not a JSON
    /// object of strings is reported as `Format`.
    pub fn open(path: impl Into<PathBuf>, quota: Option<usize>) -> StorageResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened persistent storage");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
            quota,
            persists: AtomicUsize::new(0),
        })
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("persistent storage lock poisoned".to_string()))
    }

    fn persist(&self, entries: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = temp_path(&self.path);
        fs::write(&tmp, serde_json::to_vec(entries)?)?;
        fs::rename(&tmp, &self.path)?;

        let persists = self.persists.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            path = %self.path.display(),
            entries = entries.len(),
            persists,
            "Persisted storage document"
        );
        Ok(())
    }

    /// Number of document rewrites since open.
    #[cfg(test)]
    pub(crate) fn persist_count(&self) -> usize {
        self.persists.load(Ordering::Relaxed)
    }
}

/// Sibling of `path` used for the atomic rewrite: the full file name plus
/// `.tmp`, so it never equals `path` itself.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.lock()?;
        check_quota(&entries, self.quota, key, value)?;

        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&entries) {
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.lock()?;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };

        if let Err(e) = self.persist(&entries) {
            entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[String]) -> StorageResult<usize> {
        let mut entries = self.lock()?;
        let removed: Vec<(String, String)> = keys
            .iter()
            .filter_map(|key| entries.remove_entry(key))
            .collect();
        if removed.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.persist(&entries) {
            entries.extend(removed);
            return Err(e);
        }
        Ok(removed.len())
    }

    fn list_keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
