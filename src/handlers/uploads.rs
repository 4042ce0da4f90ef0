use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::place;
use crate::error::{AppError, AppResult};
use crate::storage::{is_allowed_image, object_key, StoredObject, ALLOWED_IMAGE_TYPES};
use crate::utils::jwt::Claims;
use crate::AppState;

/// A file read from a multipart form, plus the other text fields.
struct UploadForm {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
    folder: Option<String>,
    cover: bool,
}

async fn read_form(mut multipart: Multipart, max_bytes: usize) -> AppResult<UploadForm> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut folder = None;
    let mut cover = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .to_vec();
                file = Some((file_name, content_type, data));
            }
            "folder" => {
                folder = Some(field.text().await.map_err(|e| AppError::BadRequest(e.to_string()))?);
            }
            "cover" => {
                let value = field.text().await.map_err(|e| AppError::BadRequest(e.to_string()))?;
                cover = matches!(value.trim(), "true" | "1" | "on");
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;

    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if data.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "File exceeds the {max_bytes} byte limit"
        )));
    }
    if !is_allowed_image(&content_type) {
        return Err(AppError::Validation(format!(
            "Unsupported content type '{content_type}', expected one of {}",
            ALLOWED_IMAGE_TYPES.join(", ")
        )));
    }

    Ok(UploadForm {
        file_name,
        content_type,
        data,
        folder,
        cover,
    })
}

fn folder_name(requested: Option<&str>) -> String {
    let cleaned: String = requested
        .unwrap_or("uploads")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "uploads".to_string()
    } else {
        cleaned.to_ascii_lowercase()
    }
}

/// Upload an image to object storage
pub async fn upload_blob(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<StoredObject>)> {
    let form = read_form(multipart, state.config.max_upload_bytes).await?;
    let key = object_key(&folder_name(form.folder.as_deref()), &form.file_name);

    let stored = state
        .storage
        .upload(&key, form.data, &form.content_type)
        .await?;

    tracing::info!(user_id = %claims.sub, key = %stored.key, size = stored.size, "File uploaded");
    Ok((StatusCode::CREATED, Json(stored)))
}

#[derive(Debug, Serialize)]
pub struct PlaceImageResponse {
    pub image: StoredObject,
    pub place: place::Model,
}

/// Upload an image and attach it to a place. The stored object is removed
/// again when the place cannot be updated.
pub async fn upload_place_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PlaceImageResponse>)> {
    let places = state.places();
    places.get(id).await?;

    let form = read_form(multipart, state.config.max_upload_bytes).await?;
    let key = object_key("places", &form.file_name);
    let stored = state
        .storage
        .upload(&key, form.data, &form.content_type)
        .await?;

    match places.attach_image(id, stored.url.clone(), form.cover).await {
        Ok(place) => Ok((
            StatusCode::CREATED,
            Json(PlaceImageResponse {
                image: stored,
                place,
            }),
        )),
        Err(err) => {
            if let Err(cleanup) = state.storage.delete(&stored.key).await {
                tracing::error!(key = %stored.key, error = %cleanup, "Failed to remove orphaned upload");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_name_is_sanitized() {
        assert_eq!(folder_name(None), "uploads");
        assert_eq!(folder_name(Some("../Cities")), "cities");
        assert_eq!(folder_name(Some("///")), "uploads");
        assert_eq!(folder_name(Some("guide_photos")), "guide_photos");
    }
}
