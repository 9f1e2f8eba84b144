//! Upload pipeline: normalize, name, write, commit, resolve.
//!
//! Only the write and commit steps touch the working copy, and they run under
//! [`AppState::working_copy_lock`]. When the commit fails the written artifact is removed
//! before the error is returned.

use shotput_core::{generate_name, resolve_url, AppError, UploadImageResponse};
use shotput_processing::normalize_blocking;
use shotput_storage::commit_message;

use crate::error::{from_normalize_error, from_store_error};
use crate::state::AppState;

/// A single upload as received from the client.
#[derive(Debug)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// Client-side file name; logged only.
    pub file_name: Option<String>,
}

#[tracing::instrument(
    skip(state, request),
    fields(
        file_name = request.file_name.as_deref().unwrap_or("-"),
        content_type = %request.content_type,
        size_bytes = request.bytes.len(),
    )
)]
pub async fn publish_upload(
    state: &AppState,
    request: UploadRequest,
) -> Result<UploadImageResponse, AppError> {
    let normalized = normalize_blocking(request.bytes, request.content_type)
        .await
        .map_err(from_normalize_error)?;

    let identity = generate_name(normalized.extension);
    tracing::debug!(
        image_name = %identity,
        source_format = %normalized.source_format,
        converted = normalized.converted,
        "Normalized upload"
    );

    let outcome = {
        let _guard = state.working_copy_lock.lock().await;

        let path = state
            .store
            .write(&identity, normalized.bytes)
            .await
            .map_err(from_store_error)?;

        let outcome = state
            .committer
            .commit_and_publish(&state.config, &path, &commit_message(&identity))
            .await;

        if !outcome.is_committed() {
            if let Err(e) = state.store.remove(&path).await {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove artifact after commit failure"
                );
            }
            return Err(AppError::Repository(outcome.diagnostic().to_string()));
        }

        outcome
    };

    if let Some(warning) = outcome.push_warning() {
        tracing::warn!(
            image_name = %identity,
            warning = %warning,
            "Upload committed but not pushed"
        );
    }

    let artifact = resolve_url(&state.config, &identity).published_by(&outcome);

    tracing::info!(
        image_name = %identity,
        cdn_url = %artifact.cdn_url,
        pushed = outcome.pushed(),
        "Upload published"
    );

    Ok(UploadImageResponse::new(artifact, &outcome))
}
