//! Object storage for uploaded images.

mod blob;
mod local;

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::AppResult;

pub use blob::BlobStorage;
pub use local::LocalStorage;

pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

#[derive(Debug, Clone, Serialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size: u64,
    pub content_type: String,
}

#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> AppResult<StoredObject>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    fn public_url(&self, key: &str) -> String;
}

pub fn from_config(config: &StorageConfig) -> Arc<dyn StorageBackend> {
    match config {
        StorageConfig::Local { base_path, public_url } => {
            Arc::new(LocalStorage::new(base_path.clone(), public_url.clone()))
        }
        StorageConfig::Blob { api_url, token } => {
            Arc::new(BlobStorage::new(api_url.clone(), token.clone()))
        }
    }
}

/// Build `<folder>/<uuid>-<name>`, keeping only safe characters of the file name.
pub fn object_key(folder: &str, file_name: &str) -> String {
    let cleaned: String = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '-' || c == '.');
    let name = if cleaned.is_empty() { "upload" } else { cleaned };

    format!("{}/{}-{}", folder.trim_matches('/'), Uuid::new_v4(), name)
}

pub fn is_allowed_image(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_sanitizes_name() {
        let key = object_key("places/", "../../My Photo (1).JPG");
        assert!(key.starts_with("places/"));
        assert!(key.ends_with("-my-photo--1-.jpg"));
        assert!(!key.contains(".."));
    }

    #[test]
    fn test_object_key_falls_back_for_empty_name() {
        let key = object_key("uploads", "");
        assert!(key.ends_with("-upload"));
    }

    #[test]
    fn test_only_images_allowed() {
        assert!(is_allowed_image("image/png"));
        assert!(!is_allowed_image("application/pdf"));
        assert!(!is_allowed_image("text/html"));
    }
}
