use async_trait::async_trait;
use std::pin::Pin;
use tokio::io::AsyncRead;

use crate::error::Result;

/// Byte stream handed to a storage provider
pub type BoxedReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Storage provider trait
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Copy the whole stream to `path`, replacing any existing object.
    /// Returns the number of bytes written.
    async fn put(&self, path: &str, reader: BoxedReader) -> Result<u64>;

    /// Delete data from storage. Missing objects are not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check if a file exists
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Get the storage type name
    fn storage_type(&self) -> &'static str;
}
