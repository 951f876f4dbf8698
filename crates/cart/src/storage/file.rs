//! File-backed key-value store.
//!
//! Each key maps to `<data_dir>/<key>.json`. Writes land in a uniquely named
//! temporary file in the same directory and are renamed into place, so a
//! crash mid-write leaves the previous value readable and concurrent writers
//! never share a temporary file.

use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use super::{KeyValueStore, StorageError};

/// Store that keeps one JSON file per key.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Create a store rooted at `dir`.
    ///
    /// The directory is created lazily on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` for keys that are empty, start with
    /// a dot, or contain anything other than ASCII letters, digits, `-`, `_`
    /// and `.`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

/// Write `value` to a fresh temporary file in `dir` and rename it to `path`.
fn write_atomically(dir: &Path, path: &Path, value: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(value)?;
    file.as_file().sync_all()?;
    file.persist(path)?;
    Ok(())
}

/// Reject keys that could escape the data directory.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStorage {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No stored value");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, value), fields(dir = %self.dir.display(), bytes = value.len()))]
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let dir = self.dir.clone();
        let target = path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, value.as_bytes()))
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))??;

        debug!(path = %path.display(), "Stored value");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert_eq!(storage.get("products").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested"));

        storage
            .set("products", r#"[{"id":"A"}]"#.to_string())
            .await
            .unwrap();

        assert_eq!(
            storage.get("products").await.unwrap().as_deref(),
            Some(r#"[{"id":"A"}]"#)
        );
        assert!(dir.path().join("nested/products.json").exists());
        assert_eq!(std::fs::read_dir(dir.path().join("nested")).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_writers_on_same_key() {
        let dir = tempfile::tempdir().unwrap();

        let writes: Vec<_> = (0..16)
            .map(|n| {
                // Separate stores, as two processes would have
                let storage = JsonFileStorage::new(dir.path());
                tokio::spawn(async move { storage.set("products", format!("[{n}]")).await })
            })
            .collect();
        for write in writes {
            write.await.unwrap().unwrap();
        }

        let stored = JsonFileStorage::new(dir.path())
            .get("products")
            .await
            .unwrap()
            .unwrap();
        let n: Vec<u32> = serde_json::from_str(&stored).unwrap();
        assert!(n.len() == 1 && n[0] < 16);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_path_for_rejects_traversal() {
        let storage = JsonFileStorage::new("/tmp/carts");
        assert!(matches!(
            storage.path_for("../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.path_for(".hidden"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.path_for(""),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_path_for_valid_key() {
        let storage = JsonFileStorage::new("/tmp/carts");
        assert_eq!(
            storage.path_for("guest-cart_v1").unwrap(),
            PathBuf::from("/tmp/carts/guest-cart_v1.json")
        );
    }
}
