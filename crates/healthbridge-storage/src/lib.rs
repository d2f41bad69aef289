//! # healthbridge-storage
//!
//! Blob storage for donation images. Providers implement the
//! [`healthbridge_core::traits::blob::BlobStore`] trait; the
//! [`manager::StorageManager`] selects a provider from configuration and
//! generates stable image paths.

pub mod manager;
pub mod providers;
