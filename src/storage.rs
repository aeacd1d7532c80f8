//! Local persistence
//!
//! The client keeps a handful of strings on the device between visits: the
//! recently served questions, the last phone used, and the app version.
//! Reads and writes are not atomic across concurrent sessions on the same
//! device; the last writer wins.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// String key/value storage that survives between sessions
pub trait Storage {
    /// Returns the value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: String);

    /// Removes the value stored under `key`
    fn remove(&mut self, key: &str);
}

/// Storage kept in memory only
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Storage backed by a JSON object in a file
///
/// The whole file is rewritten on every change. Write failures are logged
/// and the in-memory value is kept, so the current session still sees it.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStorage {
    /// Opens the storage file, starting empty if it is missing or unreadable
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("ignoring malformed storage file {}: {e}", path.display());
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                log::warn!("cannot read storage file {}: {e}", path.display());
                HashMap::new()
            }
        };
        Self { path, values }
    }

    fn flush(&self) {
        let result = serde_json::to_string(&self.values)
            .map_err(std::io::Error::other)
            .and_then(|contents| fs::write(&self.path, contents));
        if let Err(e) = result {
            log::error!("cannot write storage file {}: {e}", self.path.display());
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.flush();
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("trivial-storage-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::default();
        assert_eq!(storage.get("a"), None);
        storage.set("a", "1".to_owned());
        assert_eq!(storage.get("a").as_deref(), Some("1"));
        storage.remove("a");
        assert_eq!(storage.get("a"), None);
    }

    #[test]
    fn test_file_storage_persists() {
        let path = temp_path("persists");
        let _ = fs::remove_file(&path);

        let mut storage = FileStorage::open(&path);
        storage.set("phone", "600111222".to_owned());

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get("phone").as_deref(), Some("600111222"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_storage_malformed_starts_empty() {
        let path = temp_path("malformed");
        fs::write(&path, "not json").unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get("anything"), None);

        let _ = fs::remove_file(&path);
    }
}
