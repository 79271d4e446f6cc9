//! Object Store: where uploaded images end up.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;

use crate::store::StoreError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the public URL of the object.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, StoreError>;
}

/// Writes objects below a local directory that is served at `public_base`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }
}

/// Keys are relative, `/`-separated paths with no traversal.
fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && !key.contains('\\')
        && !key.contains('\0')
        && key.split('/').all(|part| !part.is_empty() && part != "." && part != "..")
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, StoreError> {
        if !is_safe_key(key) {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid object key '{}'", key),
            )));
        }

        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::info!(key, content_type, size = bytes.len(), "object stored");
        Ok(format!("{}/{}", self.public_base.trim_end_matches('/'), key))
    }
}
