//! File-based storage implementation for native platforms.

use super::{KeyValueStore, StorageError, StorageResult};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// File-based storage for native platforms.
///
/// Stores each key as a file in a specified directory. Writes go through a
/// temporary sibling file and a rename, so readers never observe a partial value.
pub struct FileStore {
    /// Base directory for stored slots.
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new file store with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/pinboard/store/`
    /// On Windows: `%LOCALAPPDATA%\pinboard\store\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("pinboard").join("store"))
    }

    /// Get the file path for a key.
    ///
    /// ASCII letters, digits and `-` are kept; every other byte is written as
    /// `_XX` (uppercase hex), so distinct keys never share a file.
    fn slot_path(&self, key: &str) -> PathBuf {
        let mut safe_key = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                safe_key.push(byte as char);
            } else {
                safe_key.push_str(&format!("_{:02X}", byte));
            }
        }
        self.base_path.join(format!("{}.json", safe_key))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp)
            .map_err(|e| StorageError::Io(format!("Failed to create {}: {}", tmp.display(), e)))?;
        file.write_all(value.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e)))?;

        fs::rename(&tmp, &path)
            .map_err(|e| StorageError::Io(format!("Failed to replace {}: {}", path.display(), e)))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.slot_path(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_set_get() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("canvasElements", "[{\"a\":1}]").unwrap();
        assert_eq!(
            store.get("canvasElements").unwrap().as_deref(),
            Some("[{\"a\":1}]")
        );
    }

    #[test]
    fn test_file_store_missing() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        assert!(store.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_file_store_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::new(nested.clone()).unwrap();

        store.set("slot", "x").unwrap();
        assert!(nested.join("slot.json").exists());
        assert!(!nested.join("slot.json.tmp").exists());
    }

    #[test]
    fn test_file_store_remove() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("slot", "x").unwrap();
        store.remove("slot").unwrap();
        assert!(store.get("slot").unwrap().is_none());
    }

    #[test]
    fn test_file_store_similar_keys_do_not_collide() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("a/b", "slash").unwrap();
        store.set("a_b", "underscore").unwrap();
        store.set("a.b", "dot").unwrap();

        assert_eq!(store.get("a/b").unwrap().as_deref(), Some("slash"));
        assert_eq!(store.get("a_b").unwrap().as_deref(), Some("underscore"));
        assert_eq!(store.get("a.b").unwrap().as_deref(), Some("dot"));
        assert!(dir.path().join("a_2Fb.json").exists());
    }

    #[test]
    fn test_file_store_sanitizes_key() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("test/key:with*special", "v").unwrap();
        assert_eq!(
            store.get("test/key:with*special").unwrap().as_deref(),
            Some("v")
        );
    }
}
