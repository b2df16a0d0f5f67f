//! File-backed storage: one JSON file per key under a data directory.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{KvStore, StoreError};

/// A store that keeps each key in `<data_dir>/<key>.json`.
///
/// Keys are the well-known constants in [`super::keys`], so no escaping is
/// performed beyond rejecting path separators.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Well-known keys never contain separators; strip them anyway so a
        // bad key cannot escape the data directory.
        let safe: String = key
            .chars()
            .map(|c| if std::path::is_separator(c) { '_' } else { c })
            .collect();
        self.root.join(format!("{safe}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn persists_across_reopen() {
        let (dir, store) = temp_store();
        store.set("shopping-cart", r#"[{"id":"p1"}]"#).unwrap();
        drop(store);

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("shopping-cart").unwrap().as_deref(),
            Some(r#"[{"id":"p1"}]"#)
        );
    }

    #[test]
    fn missing_key_is_none() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dir, store) = temp_store();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn keys_cannot_escape_root() {
        let (dir, store) = temp_store();
        store.set("../escape", "v").unwrap();

        // The write happened inside the data directory.
        assert!(dir.path().join(".._escape.json").exists());
    }
}
