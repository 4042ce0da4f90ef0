use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, AppResult};

use super::{StorageBackend, StoredObject};

pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(base_path: PathBuf, base_url: String) -> Self {
        Self { base_path, base_url }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::BadRequest(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> AppResult<StoredObject> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Upstream(format!("Failed to create directory: {e}")))?;
        }

        let size = data.len() as u64;
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to write file: {e}")))?;

        tracing::debug!(key, size, "Stored file locally");

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Upstream(format!("Failed to delete file: {e}"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> LocalStorage {
        let dir = std::env::temp_dir().join(format!("tunisia-directory-{}", uuid::Uuid::new_v4()));
        LocalStorage::new(dir, "/files/".to_string())
    }

    #[tokio::test]
    async fn test_upload_then_delete() {
        let storage = temp_storage();
        let stored = storage
            .upload("places/fort.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        assert_eq!(stored.url, "/files/places/fort.png");
        assert_eq!(stored.size, 3);
        let on_disk = storage.base_path().join("places/fort.png");
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), vec![1, 2, 3]);

        storage.delete("places/fort.png").await.unwrap();
        assert!(!on_disk.exists());
        // Deleting twice is fine
        storage.delete("places/fort.png").await.unwrap();

        let _ = tokio::fs::remove_dir_all(storage.base_path()).await;
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let storage = temp_storage();
        let err = storage
            .upload("../escape.png", vec![0], "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
