//! Provenance committer
//!
//! Opening, staging and committing are fatal for the upload: the caller must remove the
//! artifact. Pushing is not: a push failure or timeout leaves a local commit and a
//! [`CommitOutcome::LocalOnly`] explaining what went wrong.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use shotput_core::{ArtifactIdentity, CommitOutcome, PushStatus, RepositoryConfig};

use crate::vcs::{VcsError, VcsRepository, VersionControl};

/// Commit message recording the addition of one artifact.
pub fn commit_message(identity: &ArtifactIdentity) -> String {
    format!("Add image {} via Shotput", identity.file_name())
}

#[derive(Clone)]
pub struct ProvenanceCommitter {
    vcs: Arc<dyn VersionControl>,
}

impl ProvenanceCommitter {
    pub fn new(vcs: Arc<dyn VersionControl>) -> Self {
        Self { vcs }
    }

    /// Stage and commit `path`, then push when `git_auto_push` is enabled.
    #[tracing::instrument(skip(self, config, path, message), fields(path = %path.display()))]
    pub async fn commit_and_publish(
        &self,
        config: &RepositoryConfig,
        path: &Path,
        message: &str,
    ) -> CommitOutcome {
        let committed = {
            let vcs = self.vcs.clone();
            let root = config.images_repo_path.clone();
            let artifact = path.to_path_buf();
            let message = message.to_string();
            tokio::task::spawn_blocking(move || record(vcs.as_ref(), &root, &artifact, &message))
                .await
        };

        let (repository, commit_id) = match committed {
            Ok(Ok(committed)) => committed,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Failed to record artifact in repository");
                return CommitOutcome::Failed {
                    message: e.to_string(),
                };
            }
            Err(e) => {
                tracing::error!(error = %e, "Commit task failed");
                return CommitOutcome::Failed {
                    message: format!("commit task failed: {}", e),
                };
            }
        };

        tracing::info!(commit_id = %commit_id, "Committed artifact");

        if !config.git_auto_push {
            return CommitOutcome::LocalOnly {
                message: format!(
                    "Committed {} locally; auto-push is disabled",
                    short_id(&commit_id)
                ),
                commit_id,
                push: PushStatus::NotAttempted,
            };
        }

        let remote = config.git_remote.clone();
        let pushed = {
            let remote = remote.clone();
            tokio::time::timeout(
                config.push_timeout,
                tokio::task::spawn_blocking(move || repository.push(&remote)),
            )
            .await
        };

        let failure = match pushed {
            Ok(Ok(Ok(()))) => {
                tracing::info!(commit_id = %commit_id, remote = %remote, "Pushed commit");
                return CommitOutcome::Pushed {
                    message: format!(
                        "Committed {} and pushed to '{}'",
                        short_id(&commit_id),
                        remote
                    ),
                    commit_id,
                };
            }
            Ok(Ok(Err(e))) => e.to_string(),
            Ok(Err(e)) => format!("push task failed: {}", e),
            Err(_) => format!(
                "Push to '{}' timed out after {}s",
                remote,
                config.push_timeout.as_secs()
            ),
        };

        tracing::warn!(
            commit_id = %commit_id,
            remote = %remote,
            error = %failure,
            "Push failed, commit kept locally"
        );

        CommitOutcome::LocalOnly {
            message: format!(
                "Committed {} locally, but push failed: {}",
                short_id(&commit_id),
                failure
            ),
            commit_id,
            push: PushStatus::Failed(failure),
        }
    }
}

/// Open, stage and commit. Returns the open repository for the push step.
fn record(
    vcs: &dyn VersionControl,
    root: &Path,
    artifact: &Path,
    message: &str,
) -> Result<(Box<dyn VcsRepository>, String), VcsError> {
    let repository = vcs.open(root)?;
    let workdir = repository
        .workdir()
        .ok_or_else(|| VcsError::NotARepository {
            path: root.to_path_buf(),
            message: "repository has no working tree".to_string(),
        })?;

    let relative = relative_to(&workdir, artifact)?;
    let committed = repository
        .stage(&relative)
        .and_then(|()| repository.commit(message));

    match committed {
        Ok(commit_id) => Ok((repository, commit_id)),
        Err(e) => {
            // The caller removes the file, so its index entry has to go as well.
            if let Err(unstage_error) = repository.unstage(&relative) {
                tracing::error!(
                    path = %relative.display(),
                    error = %unstage_error,
                    "Failed to unstage artifact after failed commit"
                );
            }
            Err(e)
        }
    }
}

/// `artifact` relative to `workdir`, resolving symlinks on both sides.
fn relative_to(workdir: &Path, artifact: &Path) -> Result<PathBuf, VcsError> {
    let workdir = workdir
        .canonicalize()
        .unwrap_or_else(|_| workdir.to_path_buf());
    let artifact_abs = artifact
        .canonicalize()
        .unwrap_or_else(|_| artifact.to_path_buf());

    artifact_abs
        .strip_prefix(&workdir)
        .map(Path::to_path_buf)
        .map_err(|_| VcsError::OutsideWorkingCopy {
            path: artifact.to_path_buf(),
            workdir,
        })
}

fn short_id(commit_id: &str) -> &str {
    commit_id.get(..7).unwrap_or(commit_id)
}
