//! Storage manager — provider selection and image path generation.

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use healthbridge_core::config::storage::StorageConfig;
use healthbridge_core::error::AppError;
use healthbridge_core::result::AppResult;
use healthbridge_core::traits::blob::BlobStore;

use crate::providers::LocalBlobStore;

/// Owns the configured blob store and the image path convention.
#[derive(Debug, Clone)]
pub struct StorageManager {
    store: Arc<dyn BlobStore>,
}

impl StorageManager {
    /// Build the manager from configuration.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let store: Arc<dyn BlobStore> = match config.provider.as_str() {
            "local" => Arc::new(LocalBlobStore::new(&config.root).await?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'"
                )));
            }
        };
        Ok(Self { store })
    }

    /// Wrap an existing blob store (used by tests).
    pub fn with_store(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Generate the blob path for a donation image.
    pub fn image_path(donation_hint: Uuid, filename: &str) -> String {
        let ext = filename
            .rsplit('.')
            .next()
            .filter(|e| *e != filename && !e.is_empty())
            .unwrap_or("bin");
        format!("donations/{donation_hint}/image.{}", ext.to_lowercase())
    }

    /// Store an image blob.
    pub async fn put_image(&self, path: &str, data: Bytes) -> AppResult<()> {
        self.store.write(path, data).await
    }

    /// Read an image blob back.
    pub async fn get_image(&self, path: &str) -> AppResult<Bytes> {
        self.store.read(path).await
    }

    /// Delete an image blob. Missing blobs are not an error.
    pub async fn delete_image(&self, path: &str) -> AppResult<()> {
        self.store.delete(path).await
    }
}
