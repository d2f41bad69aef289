//! Blob store abstraction for donation images.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Backend-agnostic blob store.
///
/// The application treats image storage as an external collaborator:
/// writes must succeed before a donation is persisted, while deletes are
/// best-effort (callers log and continue on failure).
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Provider identifier, e.g. `"local"`.
    fn provider_type(&self) -> &str;

    /// Store a blob at the given relative path, creating parents as needed.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Read a blob back in full.
    async fn read(&self, path: &str) -> AppResult<Bytes>;

    /// Delete a blob. Deleting a missing blob is not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether a blob exists.
    async fn exists(&self, path: &str) -> AppResult<bool>;
}
