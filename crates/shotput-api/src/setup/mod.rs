//! Application setup and initialization

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use shotput_core::Config;
use shotput_storage::{ArtifactStore, GitVersionControl, LocalArtifactStore, ProvenanceCommitter};

use crate::state::AppState;

/// Build the application state and router.
///
/// Fails when the image directory cannot be created; uploads could never succeed.
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router)> {
    log_configuration(config);

    let store = LocalArtifactStore::from_config(&config.repository);
    store
        .ensure_directory()
        .await
        .context("Could not create image save directory; check permissions and path")?;
    tracing::info!(path = %store.directory().display(), "Image save directory ensured");

    let committer = ProvenanceCommitter::new(Arc::new(GitVersionControl));
    let state = Arc::new(AppState::new(
        config.repository.clone(),
        Arc::new(store),
        committer,
        !config.server.is_production(),
    ));

    let router = routes::setup_routes(&config.server, state.clone());

    Ok((state, router))
}

fn log_configuration(config: &Config) {
    let repository = &config.repository;

    tracing::info!(
        source = %config.source,
        images_repo_path = %repository.images_repo_path.display(),
        image_sub_dir = %repository.image_sub_dir,
        cdn_host = %repository.cdn.host,
        cdn_user = %repository.cdn.user,
        cdn_repo = %repository.cdn.repo,
        cdn_branch = %repository.cdn.branch,
        git_auto_push = repository.git_auto_push,
        git_remote = %repository.git_remote,
        environment = %config.server.environment,
        "Configuration loaded"
    );

    if repository.uses_default_repo_path() {
        tracing::warn!(
            images_repo_path = %repository.images_repo_path.display(),
            "images_repo_path is using the default value; review the config file"
        );
    }
    if repository.uses_placeholder_cdn_user() {
        tracing::warn!(
            user = %repository.cdn.user,
            "static_cdn.user is using the placeholder value; review the config file"
        );
    }
}
