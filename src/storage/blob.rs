use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

use super::{StorageBackend, StoredObject};

/// HTTP blob store: `PUT {api_url}/{key}` stores an object and answers with its URL.
pub struct BlobStorage {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    url: String,
}

impl BlobStorage {
    pub fn new(api_url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.api_url, key)
    }
}

#[async_trait::async_trait]
impl StorageBackend for BlobStorage {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> AppResult<StoredObject> {
        let size = data.len() as u64;

        let response = self
            .client
            .put(self.object_url(key))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Blob upload failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Blob store rejected upload with status {}",
                response.status()
            )));
        }

        let body: PutResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed blob store response: {e}")))?;

        tracing::debug!(key, size, url = %body.url, "Stored file in blob store");

        Ok(StoredObject {
            key: key.to_string(),
            url: body.url,
            size,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.object_url(key))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Blob delete failed: {e}")))?;

        if response.status().is_success() || response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(AppError::Upstream(format!(
                "Blob store rejected delete with status {}",
                response.status()
            )))
        }
    }

    fn public_url(&self, key: &str) -> String {
        self.object_url(key)
    }
}
