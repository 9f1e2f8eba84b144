//! OpenAPI documentation.

use axum::Json;
use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use shotput_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shotput API",
        version = "0.1.0",
        description = "Upload screenshots, commit them to a git repository and get a CDN link back."
    ),
    paths(
        handlers::upload::upload_image,
        handlers::health::health_check,
    ),
    components(schemas(
        models::UploadImageResponse,
        models::PublicationStatus,
        models::HealthResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "images", description = "Image upload"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
