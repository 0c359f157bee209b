//! Storage abstraction trait
//!
//! This module defines the `Storage` trait that blob backends must implement.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Upload exceeds the {0} byte cap")]
    TooLarge(u64),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A lazily produced sequence of byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Storage abstraction trait
///
/// The upload intake writes blobs through `store_stream`; the range streaming
/// responder reads them back through `read_stream`/`read_range`. Every read
/// opens an independent cursor, so concurrent requests against the same blob
/// never share a read position.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist a blob under a tenant-scoped key by draining `reader`,
    /// spooling chunks to the backend as they arrive. Returns the key and
    /// the number of bytes written.
    ///
    /// A payload longer than `max_bytes` aborts the write, removes the
    /// partial blob, and returns `StorageError::TooLarge`.
    async fn store_stream(
        &self,
        tenant_id: &str,
        filename: &str,
        content_type: &str,
        max_bytes: u64,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<(String, u64)>;

    /// Check if a blob exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the size in bytes of a blob, if it exists.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Delete a blob by its storage key. Used only to clean up an intake
    /// that failed after the bytes were written.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Stream the whole blob without loading it into memory.
    async fn read_stream(&self, storage_key: &str) -> StorageResult<ByteStream>;

    /// Stream exactly the inclusive byte range `[start, end]` of a blob.
    ///
    /// The caller is responsible for validating the range against
    /// `content_length` first; offsets past end-of-file are an error here.
    async fn read_range(&self, storage_key: &str, start: u64, end: u64)
        -> StorageResult<ByteStream>;
}
