use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use futures::StreamExt;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `base_path`
    /// (e.g., "./uploads").
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys containing path traversal sequences that could escape
    /// the base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Generate storage key from tenant and filename
    fn generate_key(tenant_id: &str, filename: &str) -> String {
        format!("media/{}/{}", tenant_id, filename)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Remove a partially written blob after a failed or oversized intake.
    async fn remove_partial(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove partial blob"
            );
        }
    }

    async fn open_existing(&self, storage_key: &str) -> StorageResult<(PathBuf, fs::File)> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        Ok((path, file))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store_stream(
        &self,
        tenant_id: &str,
        filename: &str,
        _content_type: &str,
        max_bytes: u64,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<(String, u64)> {
        let key = Self::generate_key(tenant_id, filename);
        let path = self.key_to_path(&key)?;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        // Read one byte past the cap so an oversized payload is detected
        // without draining the rest of it.
        let mut bounded = reader.take(max_bytes.saturating_add(1));
        let copied = match tokio::io::copy(&mut bounded, &mut file).await {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                self.remove_partial(&path).await;
                return Err(StorageError::UploadFailed(format!(
                    "Failed to write stream to file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        if copied > max_bytes {
            drop(file);
            self.remove_partial(&path).await;
            return Err(StorageError::TooLarge(max_bytes));
        }

        if let Err(e) = file.sync_all().await {
            drop(file);
            self.remove_partial(&path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to sync file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream store successful"
        );

        Ok((key, copied))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn content_length(&self, storage_key: &str) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let meta = fs::metadata(&path)
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
        Ok(meta.len())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(key = %storage_key, "Local storage delete successful");

        Ok(())
    }

    async fn read_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let (path, file) = self.open_existing(storage_key).await?;

        let reader = tokio_util::io::ReaderStream::new(file);

        let path_display = path.display().to_string();
        let stream = reader.map(move |result| {
            result.map_err(|e| {
                tracing::error!(path = %path_display, error = %e, "Local storage stream read error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }

    async fn read_range(
        &self,
        storage_key: &str,
        start: u64,
        end: u64,
    ) -> StorageResult<ByteStream> {
        if end < start {
            return Err(StorageError::InvalidKey(format!(
                "Invalid range {}-{}",
                start, end
            )));
        }

        let (path, mut file) = self.open_existing(storage_key).await?;

        let len = file
            .metadata()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .len();
        if end >= len {
            return Err(StorageError::DownloadFailed(format!(
                "Range {}-{} exceeds file size {}",
                start, end, len
            )));
        }

        file.seek(SeekFrom::Start(start)).await.map_err(|e| {
            StorageError::DownloadFailed(format!(
                "Failed to seek file {} to {}: {}",
                path.display(),
                start,
                e
            ))
        })?;

        // `take` bounds the read to the requested window; dropping the
        // stream mid-flight closes the handle and stops the read.
        let bounded = file.take(end - start + 1);
        let reader = tokio_util::io::ReaderStream::new(bounded);

        let path_display = path.display().to_string();
        let stream = reader.map(move |result| {
            result.map_err(|e| {
                tracing::error!(path = %path_display, error = %e, "Local storage range read error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tempfile::tempdir;

    async fn collect(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    /// Spool `data` through the streaming store path with a generous cap.
    async fn put(storage: &LocalStorage, tenant: &str, name: &str, data: &[u8]) -> String {
        let mut reader = data;
        let (key, size) = storage
            .store_stream(tenant, name, "video/mp4", 1 << 20, &mut reader)
            .await
            .unwrap();
        assert_eq!(size, data.len() as u64);
        key
    }

    #[tokio::test]
    async fn test_store_stream_and_read_back() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data = b"test data".to_vec();
        let key = put(&storage, "tenant1", "test.mp4", &data).await;

        assert!(key.contains("tenant1"));
        assert!(key.contains("test.mp4"));
        assert_eq!(storage.content_length(&key).await.unwrap(), 9);

        let stream = storage.read_stream(&key).await.unwrap();
        assert_eq!(collect(stream).await, data);
    }

    #[tokio::test]
    async fn test_store_stream_spools_chunked_reader() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let head = vec![1u8; 700];
        let tail = vec![2u8; 300];
        let mut reader = head.as_slice().chain(tail.as_slice());

        let (key, size) = storage
            .store_stream("tenant1", "chunked.bin", "video/mp4", 1 << 20, &mut reader)
            .await
            .unwrap();
        assert_eq!(size, 1000);

        let body = collect(storage.read_stream(&key).await.unwrap()).await;
        assert_eq!(&body[..700], head.as_slice());
        assert_eq!(&body[700..], tail.as_slice());
    }

    #[tokio::test]
    async fn test_store_stream_over_cap_removes_partial_blob() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data = vec![0u8; 100];
        let mut reader = data.as_slice();
        let result = storage
            .store_stream("tenant1", "big.bin", "video/mp4", 50, &mut reader)
            .await;
        assert!(matches!(result, Err(StorageError::TooLarge(50))));

        // No partial blob may be left behind after the cap fires.
        assert!(!storage.exists("media/tenant1/big.bin").await.unwrap());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage.read_stream("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        assert!(storage.delete("media/none/file.mp4").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_blob_reports_not_found() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage.content_length("media/t/missing.mp4").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));

        let result = storage.read_stream("media/t/missing.mp4").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_read_range_interior() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data: Vec<u8> = (0..=255).cycle().take(1000).map(|b: u16| b as u8).collect();
        let key = put(&storage, "tenant1", "range.bin", &data).await;

        let stream = storage.read_range(&key, 100, 199).await.unwrap();
        let body = collect(stream).await;
        assert_eq!(body.len(), 100);
        assert_eq!(body, &data[100..=199]);
    }

    #[tokio::test]
    async fn test_read_range_tail() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        let key = put(&storage, "tenant1", "tail.bin", &data).await;

        let stream = storage.read_range(&key, 900, 999).await.unwrap();
        let body = collect(stream).await;
        assert_eq!(body, &data[900..]);
    }

    #[tokio::test]
    async fn test_read_range_past_eof_errors() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let key = put(&storage, "tenant1", "small.bin", &[0u8; 10]).await;

        let result = storage.read_range(&key, 0, 10).await;
        assert!(matches!(result, Err(StorageError::DownloadFailed(_))));
    }

    #[tokio::test]
    async fn test_concurrent_disjoint_range_reads() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data: Vec<u8> = (0..1000u32).map(|i| (i % 193) as u8).collect();
        let key = put(&storage, "tenant1", "concurrent.bin", &data).await;

        let first = storage.read_range(&key, 0, 499).await.unwrap();
        let second = storage.read_range(&key, 500, 999).await.unwrap();

        // Drive both cursors concurrently; each must see only its own window.
        let (a, b) = tokio::join!(collect(first), collect(second));
        assert_eq!(a, &data[..500]);
        assert_eq!(b, &data[500..]);
    }
}
