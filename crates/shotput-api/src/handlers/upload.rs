use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use shotput_core::{AppError, UploadImageResponse};

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::{publish_upload, UploadRequest};
use crate::state::AppState;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image_blob";

/// Upload image handler
///
/// Normalizes the image, commits it to the images repository and returns its CDN address.
/// A failed push still returns 200, with `pushed = false`, `publication_status = "pending"`
/// and a `warning`.
#[utoipa::path(
    post,
    path = "/upload_image/",
    tag = "images",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image committed", body = UploadImageResponse),
        (status = 400, description = "Invalid image or request", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage or repository failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadImageResponse>, HttpAppError> {
    receive_and_publish(&state, multipart)
        .await
        .map(Json)
        .map_err(|e| e.with_details(state.expose_error_details))
}

async fn receive_and_publish(
    state: &AppState,
    multipart: Multipart,
) -> Result<UploadImageResponse, HttpAppError> {
    let request = extract_image_blob(multipart).await?;
    Ok(publish_upload(state, request).await?)
}

/// Read the single `image_blob` field. Other fields are ignored.
async fn extract_image_blob(mut multipart: Multipart) -> Result<UploadRequest, HttpAppError> {
    let mut request: Option<UploadRequest> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        if request.is_some() {
            return Err(AppError::InvalidInput(format!(
                "Multiple '{}' fields are not allowed",
                IMAGE_FIELD
            ))
            .into());
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        request = Some(UploadRequest {
            bytes: bytes.to_vec(),
            content_type,
            file_name,
        });
    }

    request.ok_or_else(|| {
        AppError::InvalidInput(format!("No '{}' field in upload", IMAGE_FIELD)).into()
    })
}
