//! Image blob storage configuration.

use serde::{Deserialize, Serialize};

/// Blob storage configuration for donation images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider: currently only `"local"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory for locally stored blobs.
    #[serde(default = "default_root")]
    pub root: String,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            root: default_root(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_root() -> String {
    "data/images".to_string()
}

fn default_max_upload() -> u64 {
    10 * 1024 * 1024
}
