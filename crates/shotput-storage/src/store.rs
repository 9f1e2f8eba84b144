//! Artifact store
//!
//! Artifacts are written to a temporary file in the target directory, synced, and then
//! linked into place with a no-clobber rename. A name collision is an error.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shotput_core::{ArtifactIdentity, RepositoryConfig};
use thiserror::Error;
use tokio::fs;

/// Artifact store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Artifact already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Directory artifacts are written to.
    fn directory(&self) -> &Path;

    /// Create the artifact directory if needed. Idempotent.
    async fn ensure_directory(&self) -> StoreResult<()>;

    /// Write `bytes` under the identity's file name and return the absolute path.
    async fn write(&self, identity: &ArtifactIdentity, bytes: Vec<u8>) -> StoreResult<PathBuf>;

    /// Delete a previously written artifact. A missing file is not an error.
    async fn remove(&self, path: &Path) -> StoreResult<()>;
}

/// Local filesystem artifact store
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    directory: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn from_config(config: &RepositoryConfig) -> Self {
        Self::new(config.image_dir())
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    fn directory(&self) -> &Path {
        &self.directory
    }

    async fn ensure_directory(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.directory)
            .await
            .map_err(|source| StoreError::CreateDirectory {
                path: self.directory.clone(),
                source,
            })
    }

    async fn write(&self, identity: &ArtifactIdentity, bytes: Vec<u8>) -> StoreResult<PathBuf> {
        self.ensure_directory().await?;

        let directory = fs::canonicalize(&self.directory)
            .await
            .map_err(|source| StoreError::CreateDirectory {
                path: self.directory.clone(),
                source,
            })?;
        let target = directory.join(identity.file_name());
        let size = bytes.len();
        let start = std::time::Instant::now();

        let written = {
            let target = target.clone();
            tokio::task::spawn_blocking(move || write_atomic(&directory, &target, &bytes))
                .await
                .map_err(|e| StoreError::Task(e.to_string()))?
        };
        written?;

        tracing::info!(
            path = %target.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Artifact written"
        );

        Ok(target)
    }

    async fn remove(&self, path: &Path) -> StoreResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Artifact removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Artifact already absent");
                Ok(())
            }
            Err(source) => Err(StoreError::Remove {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn write_atomic(directory: &Path, target: &Path, bytes: &[u8]) -> StoreResult<()> {
    let write_error = |source| StoreError::Write {
        path: target.to_path_buf(),
        source,
    };

    let mut file = tempfile::Builder::new()
        .prefix(".shotput-")
        .tempfile_in(directory)
        .map_err(write_error)?;
    file.write_all(bytes).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;

    file.persist_noclobber(target).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            StoreError::AlreadyExists(target.to_path_buf())
        } else {
            write_error(e.error)
        }
    })?;

    Ok(())
}
