use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{BoxedReader, StorageProvider};

/// Local file system storage provider
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn get_full_path(&self, path: &str) -> Result<PathBuf> {
        // Asset names are flat; anything that could leave the root is refused
        if path.is_empty() || path.contains("..") || path.contains('/') || path.contains('\\') {
            return Err(AppError::Storage(format!("Invalid asset path: {}", path)));
        }
        Ok(self.base_path.join(path))
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn put(&self, path: &str, mut reader: BoxedReader) -> Result<u64> {
        let full_path = self.get_full_path(path)?;

        // Ensure parent directory exists
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Create (truncating) and copy; a failed copy leaves the partial file
        let mut file = fs::File::create(&full_path).await?;
        let written = tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;

        tracing::debug!("Saved {} bytes to {:?}", written, full_path);
        Ok(written)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.get_full_path(path)?;

        if self.exists(path).await? {
            fs::remove_file(&full_path).await?;
            tracing::debug!("Deleted file {:?}", full_path);
        }

        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.get_full_path(path)?;
        Ok(fs::try_exists(&full_path).await?)
    }

    fn storage_type(&self) -> &'static str {
        "local"
    }
}
