//! Test helpers: build the router over a throwaway git working copy.
//!
//! Run from workspace root: `cargo test -p shotput-api`.

#![allow(dead_code)]

pub mod fixtures;
pub mod repo;

use std::path::Path;
use std::time::Duration;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use shotput_core::{CdnIdentity, Config, ConfigSource, RepositoryConfig, ServerConfig};

pub const IMAGE_FIELD: &str = "image_blob";

/// Repository configuration pointing at `repo_path`, with push disabled.
pub fn repository_config(repo_path: &Path) -> RepositoryConfig {
    RepositoryConfig {
        images_repo_path: repo_path.to_path_buf(),
        image_sub_dir: "blog-media".to_string(),
        git_auto_push: false,
        push_timeout: Duration::from_secs(10),
        cdn: CdnIdentity {
            user: "octocat".to_string(),
            repo: "screenshots".to_string(),
            ..CdnIdentity::default()
        },
        ..RepositoryConfig::default()
    }
}

/// Setup test app with the default upload limit.
pub async fn setup_test_app(repository: RepositoryConfig) -> TestServer {
    setup_test_app_with_limit(repository, ServerConfig::default().max_upload_bytes).await
}

pub async fn setup_test_app_with_limit(
    repository: RepositoryConfig,
    max_upload_bytes: usize,
) -> TestServer {
    let server = ServerConfig {
        max_upload_bytes,
        ..ServerConfig::default()
    };
    setup_test_app_with_server(repository, server).await
}

pub async fn setup_test_app_with_server(
    repository: RepositoryConfig,
    server: ServerConfig,
) -> TestServer {
    let config = Config {
        server,
        source: ConfigSource::File(repository.images_repo_path.join("config.toml")),
        repository,
    };

    let (_state, router) = shotput_api::setup::initialize_app(&config)
        .await
        .expect("Failed to initialize app");

    TestServer::new(router).expect("Failed to create test server")
}

/// POST `bytes` as the `image_blob` field.
pub async fn upload(server: &TestServer, bytes: Vec<u8>, mime: &str) -> TestResponse {
    let part = Part::bytes(bytes::Bytes::from(bytes))
        .file_name("screenshot")
        .mime_type(mime);
    let form = MultipartForm::new().add_part(IMAGE_FIELD, part);
    server.post("/upload_image/").multipart(form).await
}
