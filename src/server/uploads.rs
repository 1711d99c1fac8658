use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::RequireAdmin;
use crate::images::{ImageStoreError, url_for};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::{AppState, ClientIp};
use crate::types::ActivityAction;

impl From<ImageStoreError> for ApiError {
    fn from(e: ImageStoreError) -> Self {
        match e {
            ImageStoreError::NotFound => ApiError::not_found("Image not found"),
            ImageStoreError::InvalidFilename => ApiError::bad_request("Invalid filename"),
            ImageStoreError::UnsupportedType(ct) => {
                ApiError::bad_request(format!("Unsupported image type: {ct}"))
            }
            ImageStoreError::Io(e) => {
                tracing::error!("Image storage error: {e}");
                ApiError::internal("Internal server error")
            }
        }
    }
}

pub async fn upload_image(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
        .ok_or_else(|| ApiError::bad_request("No image file provided"))?;

    let content_type = field
        .content_type()
        .ok_or_else(|| ApiError::bad_request("Missing image content type"))?
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;

    if data.is_empty() {
        return Err(ApiError::bad_request("No image file provided"));
    }

    let stored = state.images.store(&data, &content_type).await?;

    state.log_activity(
        admin.id,
        ActivityAction::UploadImage,
        format!("Uploaded image: {} ({} bytes)", stored.filename, stored.size),
        ip,
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            stored,
            "Image uploaded successfully",
        )),
    ))
}

pub async fn list_images(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let images = state.images.list().await?;
    Ok(Json(ApiResponse::success(images)))
}

pub async fn delete_image(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    ClientIp(ip): ClientIp,
) -> Result<Response, ApiError> {
    if !state.images.exists(&filename).await? {
        return Err(ApiError::not_found("Image not found"));
    }

    // Refuse to orphan references: deletion is blocked while any model still
    // points at this image, and the caller is told which ones.
    let in_use = state.store.models_using_image(&url_for(&filename))?;
    if !in_use.is_empty() {
        let body = json!({
            "success": false,
            "message": "Image is in use by one or more models",
            "data": { "models": in_use },
        });
        return Ok((StatusCode::CONFLICT, Json(body)).into_response());
    }

    state.images.remove(&filename).await?;

    state.log_activity(
        admin.id,
        ActivityAction::DeleteImage,
        format!("Deleted image: {filename}"),
        ip,
    );

    Ok(Json(ApiResponse::message("Image deleted successfully")).into_response())
}

/// GET /uploads/{filename} — raw image bytes, no auth. URLs leak nothing but
/// a UUID and the catalog images are not secrets.
pub async fn serve_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.images.path(&filename)?;

    let data = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::not_found("Image not found"))?;

    let content_type = match filename.rsplit('.').next().map(str::to_lowercase).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };

    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}
