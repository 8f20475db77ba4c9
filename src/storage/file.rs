//! JSON-file store for state that must survive restarts.
//!
//! The whole map is rewritten on every mutation via a temp file and rename,
//! so a crash mid-write leaves the previous snapshot intact.

use super::KeyValueStore;
use crate::error::WhoopError;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries if the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WhoopError> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                WhoopError::Storage(format!("Corrupt token store {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(WhoopError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened token store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write `entries` to disk, replacing the previous snapshot atomically.
    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), WhoopError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| WhoopError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| WhoopError::Storage(format!("Failed to encode token store: {}", e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Err(e) = write_private(&tmp, &json) {
            let _ = fs::remove_file(&tmp);
            return Err(WhoopError::Storage(format!(
                "Failed to write {}: {}",
                tmp.display(),
                e
            )));
        }

        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            WhoopError::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })
    }

    /// Apply `change` to a copy of the entries, and keep it only once it is
    /// on disk.
    fn update<T>(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> T,
    ) -> Result<T, WhoopError> {
        let mut entries = self.lock();
        let mut next = entries.clone();
        let out = change(&mut next);

        if next != *entries {
            self.flush(&next)?;
            *entries = next;
        }
        Ok(out)
    }
}

/// Create or truncate `path` readable by the owner only; it holds bearer tokens.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WhoopError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), WhoopError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn take(&self, key: &str) -> Result<Option<String>, WhoopError> {
        self.update(|entries| entries.remove(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.json");

        let store = FileStore::open(&path).unwrap();
        store.set("whoop_token", "abc").unwrap();
        store.set("whoop_refresh_token", "r1").unwrap();
        store.remove("whoop_refresh_token").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("whoop_token").as_deref(), Some("abc"));
        assert!(reopened.get("whoop_refresh_token").is_none());
    }

    #[test]
    fn test_take_persists_removal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = FileStore::open(&path).unwrap();
        store.set("whoop_oauth_state", "n1").unwrap();
        assert_eq!(store.take("whoop_oauth_state").unwrap().as_deref(), Some("n1"));
        assert!(store.take("whoop_oauth_state").unwrap().is_none());

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get("whoop_oauth_state").is_none());
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("tokens.json");
        let store = FileStore::open(&path).unwrap();

        // A plain file where the parent directory should be
        std::fs::write(dir.path().join("state"), "").unwrap();

        let err = store.set("whoop_token", "abc").unwrap_err();
        assert!(matches!(err, WhoopError::Storage(_)));
        assert!(store.get("whoop_token").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let store = FileStore::open(&path).unwrap();
        store.set("whoop_token", "abc").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, WhoopError::Storage(_)));
    }
}
