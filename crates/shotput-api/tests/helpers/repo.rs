//! Throwaway git working copies and remotes.

use std::path::{Path, PathBuf};

use git2::{Repository, Sort};
use tempfile::TempDir;

/// A git lock file, removed on drop. While held, the locked file cannot be written.
pub struct GitLock(PathBuf);

impl Drop for GitLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// A fresh working copy with a committer identity configured.
pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
    remote_dir: Option<TempDir>,
}

impl TestRepo {
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init repository");
        {
            let mut config = repo.config().expect("Failed to open repository config");
            config.set_str("user.name", "Test Author").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        Self {
            dir,
            repo,
            remote_dir: None,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add `origin` pointing at a fresh bare repository.
    pub fn with_bare_remote(mut self) -> Self {
        let remote_dir = tempfile::tempdir().expect("Failed to create remote directory");
        Repository::init_bare(remote_dir.path()).expect("Failed to init bare remote");
        self.repo
            .remote("origin", &remote_dir.path().to_string_lossy())
            .expect("Failed to add remote");
        self.remote_dir = Some(remote_dir);
        self
    }

    /// Add `origin` pointing somewhere that does not exist.
    pub fn with_broken_remote(self) -> Self {
        let missing = self.path().join("no-such-remote.git");
        self.repo
            .remote("origin", &missing.to_string_lossy())
            .expect("Failed to add remote");
        self
    }

    /// Lock the branch `HEAD` points at, so commits cannot move it.
    pub fn lock_branch(&self) -> GitLock {
        let head = self.repo.find_reference("HEAD").unwrap();
        let branch = head.symbolic_target().unwrap().to_string();
        self.lock(&format!("{}.lock", branch))
    }

    /// Lock the index, so staging cannot write it.
    pub fn lock_index(&self) -> GitLock {
        self.lock("index.lock")
    }

    fn lock(&self, relative: &str) -> GitLock {
        let path = self.repo.path().join(relative);
        std::fs::write(&path, b"").expect("Failed to create lock file");
        GitLock(path)
    }

    pub fn image_path(&self, sub_dir: &str, image_name: &str) -> PathBuf {
        self.path().join(sub_dir).join(image_name)
    }

    pub fn commit_count(&self) -> usize {
        if self.repo.head().is_err() {
            return 0;
        }
        let mut walk = self.repo.revwalk().unwrap();
        walk.set_sorting(Sort::TOPOLOGICAL).unwrap();
        walk.push_head().unwrap();
        walk.count()
    }

    pub fn head_message(&self) -> String {
        let commit = self.repo.head().unwrap().peel_to_commit().unwrap();
        commit.message().unwrap_or_default().to_string()
    }

    pub fn head_id(&self) -> String {
        self.repo.head().unwrap().target().unwrap().to_string()
    }

    /// Paths added or changed by the HEAD commit.
    pub fn head_paths(&self) -> Vec<String> {
        let commit = self.repo.head().unwrap().peel_to_commit().unwrap();
        let tree = commit.tree().unwrap();
        let parent_tree = commit.parent(0).ok().map(|p| p.tree().unwrap());
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
            .unwrap();
        diff.deltas()
            .filter_map(|d| d.new_file().path().map(|p| p.to_string_lossy().into_owned()))
            .collect()
    }

    /// Commit id the remote holds for the current branch, if any.
    pub fn remote_branch_id(&self) -> Option<String> {
        let remote_dir = self.remote_dir.as_ref()?;
        let remote = Repository::open_bare(remote_dir.path()).ok()?;
        let branch = self.repo.head().ok()?.name()?.to_string();
        let reference = remote.find_reference(&branch).ok()?;
        reference.target().map(|oid| oid.to_string())
    }
}
