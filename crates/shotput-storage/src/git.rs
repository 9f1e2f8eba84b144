//! git2 implementation of the version-control seam

use std::path::{Path, PathBuf};

use git2::{
    Commit, Cred, CredentialType, ErrorCode, PushOptions, RemoteCallbacks, Repository, Signature,
};
use shotput_core::constants::{FALLBACK_AUTHOR_EMAIL, FALLBACK_AUTHOR_NAME};

use crate::vcs::{VcsError, VcsRepository, VersionControl};

/// Credential callbacks are retried by libgit2 on failure; give up after this many.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct GitVersionControl;

impl VersionControl for GitVersionControl {
    fn open(&self, root: &Path) -> Result<Box<dyn VcsRepository>, VcsError> {
        let repository = Repository::open(root).map_err(|e| VcsError::NotARepository {
            path: root.to_path_buf(),
            message: e.message().to_string(),
        })?;
        Ok(Box::new(GitRepository { repository }))
    }
}

pub struct GitRepository {
    repository: Repository,
}

impl GitRepository {
    /// Author from `user.name`/`user.email`, or the service identity when unset.
    fn signature(&self) -> Result<Signature<'static>, git2::Error> {
        match self.repository.signature() {
            Ok(signature) => Ok(signature),
            Err(e) => {
                tracing::debug!(
                    error = %e.message(),
                    "No git identity configured, using fallback author"
                );
                Signature::now(FALLBACK_AUTHOR_NAME, FALLBACK_AUTHOR_EMAIL)
            }
        }
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>, git2::Error> {
        match self.repository.head() {
            Ok(head) => head.peel_to_commit().map(Some),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn push_current_branch(&self, remote_name: &str) -> Result<(), git2::Error> {
        let head = self.repository.head()?;
        if !head.is_branch() {
            return Err(git2::Error::from_str("HEAD is not on a branch"));
        }
        let refname = head
            .name()
            .ok_or_else(|| git2::Error::from_str("branch name is not valid UTF-8"))?;
        let refspec = format!("{0}:{0}", refname);

        let mut remote = self.repository.find_remote(remote_name)?;
        let config = self.repository.config()?;

        let mut rejection: Option<String> = None;
        {
            let mut attempts = 0;
            let mut callbacks = RemoteCallbacks::new();
            callbacks.credentials(|url, username_from_url, allowed| {
                attempts += 1;
                if attempts > MAX_CREDENTIAL_ATTEMPTS {
                    return Err(git2::Error::from_str("authentication failed"));
                }
                if allowed.contains(CredentialType::SSH_KEY) {
                    if let Some(username) = username_from_url {
                        return Cred::ssh_key_from_agent(username);
                    }
                }
                if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                    return Cred::credential_helper(&config, url, username_from_url);
                }
                if allowed.contains(CredentialType::DEFAULT) {
                    return Cred::default();
                }
                Err(git2::Error::from_str("no supported credentials available"))
            });
            callbacks.push_update_reference(|reference, status| {
                if let Some(message) = status {
                    rejection = Some(format!("{} rejected: {}", reference, message));
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);
            remote.push(&[refspec.as_str()], Some(&mut options))?;
        }

        match rejection {
            Some(message) => Err(git2::Error::from_str(&message)),
            None => Ok(()),
        }
    }
}

impl VcsRepository for GitRepository {
    fn workdir(&self) -> Option<PathBuf> {
        self.repository.workdir().map(Path::to_path_buf)
    }

    fn stage(&self, relative_path: &Path) -> Result<(), VcsError> {
        let stage_error = |e: git2::Error| VcsError::Stage {
            path: relative_path.to_path_buf(),
            message: e.message().to_string(),
        };

        let mut index = self.repository.index().map_err(stage_error)?;
        index.add_path(relative_path).map_err(stage_error)?;
        index.write().map_err(stage_error)?;
        Ok(())
    }

    fn unstage(&self, relative_path: &Path) -> Result<(), VcsError> {
        let stage_error = |e: git2::Error| VcsError::Stage {
            path: relative_path.to_path_buf(),
            message: e.message().to_string(),
        };

        let head = self.head_commit().map_err(stage_error)?;
        self.repository
            .reset_default(head.as_ref().map(|c| c.as_object()), [relative_path])
            .map_err(stage_error)
    }

    fn commit(&self, message: &str) -> Result<String, VcsError> {
        let commit_error = |e: git2::Error| VcsError::Commit(e.message().to_string());

        let mut index = self.repository.index().map_err(commit_error)?;
        let tree_id = index.write_tree().map_err(commit_error)?;
        let tree = self.repository.find_tree(tree_id).map_err(commit_error)?;
        let signature = self.signature().map_err(commit_error)?;

        let parent = self.head_commit().map_err(commit_error)?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        let oid = self
            .repository
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parents,
            )
            .map_err(commit_error)?;

        Ok(oid.to_string())
    }

    fn push(&self, remote: &str) -> Result<(), VcsError> {
        self.push_current_branch(remote)
            .map_err(|e| VcsError::Push {
                remote: remote.to_string(),
                message: e.message().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn init_repo(path: &Path) -> Repository {
        let repo = Repository::init(path).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        repo
    }

    #[test]
    fn test_open_non_repository() {
        let dir = tempdir().unwrap();
        let err = GitVersionControl.open(dir.path()).err().unwrap();
        assert!(matches!(err, VcsError::NotARepository { .. }));
    }

    #[test]
    fn test_first_commit_on_unborn_branch() {
        let dir = tempdir().unwrap();
        let repo = init_repo(dir.path());
        std::fs::create_dir(dir.path().join("blog-media")).unwrap();
        std::fs::write(dir.path().join("blog-media/a.png"), b"a").unwrap();

        let working_copy = GitVersionControl.open(dir.path()).unwrap();
        working_copy.stage(Path::new("blog-media/a.png")).unwrap();
        let id = working_copy.commit("Add image a.png via Shotput").unwrap();

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.id().to_string(), id);
        assert_eq!(head.parent_count(), 0);
        assert_eq!(head.message(), Some("Add image a.png via Shotput"));
        assert_eq!(head.author().name(), Some("Test User"));
        assert!(head
            .tree()
            .unwrap()
            .get_path(Path::new("blog-media/a.png"))
            .is_ok());
    }

    #[test]
    fn test_second_commit_has_parent() {
        let dir = tempdir().unwrap();
        let repo = init_repo(dir.path());
        let working_copy = GitVersionControl.open(dir.path()).unwrap();

        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        working_copy.stage(Path::new("a.png")).unwrap();
        let first = working_copy.commit("first").unwrap();

        std::fs::write(dir.path().join("b.png"), b"b").unwrap();
        working_copy.stage(Path::new("b.png")).unwrap();
        working_copy.commit("second").unwrap();

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.parent_count(), 1);
        assert_eq!(head.parent_id(0).unwrap().to_string(), first);
    }

    fn index_has(repo: &Repository, path: &str) -> bool {
        let mut index = repo.index().unwrap();
        index.read(true).unwrap();
        index.get_path(Path::new(path), 0).is_some()
    }

    #[test]
    fn test_unstage_on_unborn_branch() {
        let dir = tempdir().unwrap();
        let repo = init_repo(dir.path());
        let working_copy = GitVersionControl.open(dir.path()).unwrap();

        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        working_copy.stage(Path::new("a.png")).unwrap();
        assert!(index_has(&repo, "a.png"));

        working_copy.unstage(Path::new("a.png")).unwrap();
        assert!(!index_has(&repo, "a.png"));
    }

    #[test]
    fn test_unstaged_path_stays_out_of_next_commit() {
        let dir = tempdir().unwrap();
        let repo = init_repo(dir.path());
        let working_copy = GitVersionControl.open(dir.path()).unwrap();

        std::fs::write(dir.path().join("first.png"), b"1").unwrap();
        working_copy.stage(Path::new("first.png")).unwrap();
        working_copy.commit("first").unwrap();

        std::fs::write(dir.path().join("dropped.png"), b"x").unwrap();
        working_copy.stage(Path::new("dropped.png")).unwrap();
        working_copy.unstage(Path::new("dropped.png")).unwrap();

        std::fs::write(dir.path().join("second.png"), b"2").unwrap();
        working_copy.stage(Path::new("second.png")).unwrap();
        working_copy.commit("second").unwrap();

        let tree = repo.head().unwrap().peel_to_commit().unwrap().tree().unwrap();
        assert!(tree.get_path(Path::new("first.png")).is_ok());
        assert!(tree.get_path(Path::new("second.png")).is_ok());
        assert!(tree.get_path(Path::new("dropped.png")).is_err());
    }

    #[test]
    fn test_stage_missing_file_fails() {
        let dir = tempdir().unwrap();
        init_repo(dir.path());
        let working_copy = GitVersionControl.open(dir.path()).unwrap();

        let err = working_copy.stage(Path::new("missing.png")).unwrap_err();
        assert!(matches!(err, VcsError::Stage { .. }));
    }

    #[test]
    fn test_push_to_bare_remote() {
        let dir = tempdir().unwrap();
        let remote_dir = tempdir().unwrap();
        let remote = Repository::init_bare(remote_dir.path()).unwrap();
        let repo = init_repo(dir.path());
        repo.remote("origin", remote_dir.path().to_str().unwrap())
            .unwrap();

        let working_copy = GitVersionControl.open(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        working_copy.stage(Path::new("a.png")).unwrap();
        let id = working_copy.commit("first").unwrap();
        working_copy.push("origin").unwrap();

        let branch = repo.head().unwrap().name().unwrap().to_string();
        let pushed = remote.find_reference(&branch).unwrap();
        assert_eq!(pushed.target().unwrap().to_string(), id);
    }

    #[test]
    fn test_push_to_missing_remote_fails() {
        let dir = tempdir().unwrap();
        init_repo(dir.path());
        let working_copy = GitVersionControl.open(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        working_copy.stage(Path::new("a.png")).unwrap();
        working_copy.commit("first").unwrap();

        let err = working_copy.push("origin").unwrap_err();
        assert!(matches!(err, VcsError::Push { ref remote, .. } if remote == "origin"));
    }
}
