use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::StoreError;

/// Storage for uploaded files.
///
/// Keys are relative, `/`-separated paths (`documents/3f2a…_scan.pdf`).
/// `FileStore` maps them onto a directory; an object-store backend only
/// needs to implement this trait.
pub trait BlobStore: Send + Sync {
    /// Store a blob, overwriting any existing one.
    fn put(&self, key: &str, data: &[u8]) -> Result<(), StoreError>;

    /// `None` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Remove a blob. No-op if the key does not exist.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    fn exists(&self, key: &str) -> Result<bool, StoreError>;
}

/// BlobStore on the local filesystem, rooted at `base_dir`.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `base_dir`.
    pub fn open(base_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(base_dir).map_err(|e| StoreError::Blob(e.to_string()))?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Map a key to a path under `base_dir`. Only plain path segments are
    /// accepted, so a key can never name anything outside the root.
    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty blob key".into()));
        }
        let rel = Path::new(key);
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(StoreError::InvalidKey(format!("{:?}", key)));
        }
        Ok(self.base_dir.join(rel))
    }
}

impl BlobStore for FileStore {
    fn put(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Blob(e.to_string()))?;
        }
        fs::write(&path, data).map_err(|e| StoreError::Blob(e.to_string()))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.resolve(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        fs::read(&path)
            .map(Some)
            .map_err(|e| StoreError::Blob(e.to_string()))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| StoreError::Blob(e.to_string()))?;
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.resolve(key)?.is_file())
    }
}
