//! Raw upload storage

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Storage for the raw bytes of uploaded documents.
///
/// Implementations:
/// - `FileBlobStore`: one file per key in a local directory
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist bytes under `key`, replacing any existing blob.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Fetch the bytes stored under `key`.
    async fn read(&self, key: &str) -> Result<Vec<u8>>;
}

pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Create the store, making sure the directory exists.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| Error::write_failure(root.display().to_string(), e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        valid_key(key).then(|| self.root.join(key))
    }
}

/// Keys must name a file directly inside the root.
fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self
            .path_for(key)
            .ok_or_else(|| Error::write_failure(key, "invalid blob key"))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::write_failure(path.display().to_string(), e))
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key).ok_or_else(|| Error::BlobNotFound {
            key: key.to_string(),
        })?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::BlobNotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(Error::read_failure(path.display().to_string(), e)),
        }
    }
}
