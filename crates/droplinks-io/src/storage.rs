//! Local key-value snapshot storage.

use anyhow::Result;
use std::{collections::HashMap, fs, io, path::PathBuf};
use tracing::warn;

/// Directory under the home directory holding DropLinks data files.
pub const APP_HOME_DIR: &str = ".droplinks";

/// String key-value store backing the board snapshot.
pub trait KvStore: Send {
    /// Stored value for `key`, or `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Overwrite the value for `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store: each key becomes `<dir>/<key>.json`.
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Store rooted at `~/.droplinks`, falling back to the current
    /// directory when no home directory is available.
    pub fn open_default() -> Result<Self> {
        let dir = if let Some(mut home) = dirs::home_dir() {
            home.push(APP_HOME_DIR);
            home
        } else {
            std::env::current_dir()?
        };
        Ok(Self::new(dir))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(data) => Some(data),
            Err(error) => {
                if error.kind() != io::ErrorKind::NotFound {
                    warn!(?error, ?path, "failed to read stored value");
                }
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, value)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    values: HashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileKvStore::new(dir.path().join("nested"));

        assert_eq!(store.get("droplinks-data"), None);
        store.set("droplinks-data", "{\"panels\":[]}").unwrap();
        assert_eq!(store.get("droplinks-data").as_deref(), Some("{\"panels\":[]}"));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryKvStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v2"));
    }
}
