use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{CommitOutcome, PublicationStatus, PublishedArtifact};

/// Response body of a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadImageResponse {
    /// Public CDN address; resolves once `publication_status` is `live`.
    pub cdn_url: String,
    pub image_name: String,
    pub markdown: String,
    pub commit_id: String,
    pub pushed: bool,
    pub publication_status: PublicationStatus,
    /// Push diagnostic when the commit could not be pushed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl UploadImageResponse {
    pub fn new(artifact: PublishedArtifact, outcome: &CommitOutcome) -> Self {
        Self {
            image_name: artifact.image_name(),
            cdn_url: artifact.cdn_url,
            markdown: artifact.markdown,
            commit_id: outcome.commit_id().unwrap_or_default().to_string(),
            pushed: outcome.pushed(),
            publication_status: artifact.status,
            warning: outcome.push_warning().map(str::to_string),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
